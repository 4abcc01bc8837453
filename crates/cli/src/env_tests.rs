// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_splits_selectors() {
    let caps = ColorCapabilities::parse("mt=01;31:fn=35:rv");
    assert_eq!(caps.get("mt"), Some("01;31"));
    assert_eq!(caps.get("fn"), Some("35"));
    assert!(caps.reverse_video());
}

#[test]
fn parse_ignores_empty_fields() {
    let caps = ColorCapabilities::parse("mt=01;31::fn=35:");
    assert_eq!(caps.get("mt"), Some("01;31"));
    assert_eq!(caps.get("fn"), Some("35"));
}

#[test]
fn default_has_match_capability() {
    let caps = ColorCapabilities::default();
    assert!(caps.get("mt").is_some());
}

#[test]
fn expand_grep_options_passthrough_when_unset() {
    // Relies on the test harness not setting GREP_OPTIONS; mutating
    // process-wide env vars from a test is unsafe and disallowed by the
    // workspace lint, so this only exercises the default (unset) case.
    if std::env::var_os("GREP_OPTIONS").is_none() {
        let args = expand_grep_options("ungrep".into(), vec!["-n".into(), "pat".into()]);
        assert_eq!(args, vec!["ungrep", "-n", "pat"]);
    }
}

#[test]
fn split_shell_words_splits_on_whitespace() {
    assert_eq!(split_shell_words("-n -i  foo"), vec!["-n", "-i", "foo"]);
}
