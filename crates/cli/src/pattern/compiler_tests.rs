// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::pattern::dialect::Dialect;

fn source(text: &str) -> PatternSource {
    PatternSource {
        blob: text.as_bytes().to_vec(),
        file: None,
    }
}

#[test]
fn compiles_single_literal_pattern() {
    let set = compile(&[source("foo")], Dialect::Basic, b'\n', CompileOptions::default()).unwrap();
    let hay = b"xxfooyy";
    assert!(set.dfa().find(hay, 0, hay.len()).is_some());
    assert!(set.keyword_set().is_some());
}

#[test]
fn compiles_multiple_patterns_from_one_blob() {
    let set = compile(&[source("foo\nbar")], Dialect::Basic, b'\n', CompileOptions::default()).unwrap();
    assert_eq!(set.regex_array().len(), 2);
    assert!(set.dfa().find(b"xxbaryy", 0, 7).is_some());
}

#[test]
fn reports_pattern_syntax_error_with_file_and_line() {
    let mut src = source("a(");
    src.file = Some("patterns.txt".into());
    let err = compile(&[src], Dialect::Extended, b'\n', CompileOptions::default()).unwrap_err();
    match err {
        Error::PatternSyntax { file, line, message, .. } => {
            assert_eq!(file.as_deref(), Some("patterns.txt"));
            assert_eq!(line, Some(1));
            assert!(message.starts_with("patterns.txt:1:"));
        }
        other => panic!("expected PatternSyntax, got {other:?}"),
    }
}

#[test]
fn fixed_strings_escape_metacharacters() {
    let set = compile(&[source("a.b")], Dialect::Fixed, b'\n', CompileOptions::default()).unwrap();
    assert!(set.dfa().find(b"xa.bx", 0, 5).is_some());
    assert!(set.dfa().find(b"xaxbx", 0, 5).is_none());
}

#[test]
fn whole_line_wraps_joined_pattern() {
    let opts = CompileOptions {
        whole_line: true,
        ..Default::default()
    };
    let set = compile(&[source("foo")], Dialect::Basic, b'\n', opts).unwrap();
    assert!(set.whole_line());
    assert!(set.dfa().is_match_at(b"foo", 0, 3));
    assert!(!set.dfa().is_match_at(b"xfoo", 0, 4));
}

#[test]
fn backreference_pattern_sets_has_backreference() {
    let set = compile(&[source(r"(a)\1")], Dialect::Extended, b'\n', CompileOptions::default()).unwrap();
    assert!(set.has_backreference());
    assert!(set.dfa().superset().is_some());
}

#[test]
fn empty_pattern_list_falls_back_to_empty_pattern() {
    let set = compile(&[], Dialect::Basic, b'\n', CompileOptions::default()).unwrap();
    assert!(set.dfa().find(b"anything", 0, 8).is_some());
}
