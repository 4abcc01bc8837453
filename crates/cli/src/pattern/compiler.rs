// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Pattern Compiler (§4.A): turns a pattern blob plus dialect and flags
//! into the compiled forms the match engine cascade consumes — a [`Dfa`]
//! (with its must_list and, when back-references are present, a superset),
//! an optional [`KeywordSet`], and the regex array of [`BackrefPattern`]s
//! used for whole-word/whole-line re-verification and back-reference
//! fallback.
//!
//! Grounded on the teacher's `pattern/matcher.rs::CompiledPattern::compile`
//! dispatch (one entry point, several outcomes depending on pattern shape),
//! generalized to the spec's four-stage cascade build.

use crate::error::{pattern_loc_prefix, Error};
use crate::pattern::backrefs::BackrefPattern;
use crate::pattern::dfa::Dfa;
use crate::pattern::dialect::{has_backreference, Dialect};
use crate::pattern::kwset::KeywordSet;

/// Flags that shape compilation (§4.A).
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub ignore_case: bool,
    pub whole_word: bool,
    pub whole_line: bool,
}

/// Maps a byte offset within the joined pattern blob back to the source
/// file and line it came from, for error messages (§4.A "side mapping").
#[derive(Debug, Clone)]
struct SourceSpan {
    file: Option<String>,
    line: Option<usize>,
}

/// The compiled pattern set the match engine cascade runs against.
pub struct PatternSet {
    dfa: Dfa,
    kwset: Option<KeywordSet>,
    regex_array: Vec<BackrefPattern>,
    has_backref: bool,
    whole_word: bool,
    whole_line: bool,
}

impl PatternSet {
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn keyword_set(&self) -> Option<&KeywordSet> {
        self.kwset.as_ref()
    }

    pub fn regex_array(&self) -> &[BackrefPattern] {
        &self.regex_array
    }

    pub fn has_backreference(&self) -> bool {
        self.has_backref
    }

    pub fn whole_word(&self) -> bool {
        self.whole_word
    }

    pub fn whole_line(&self) -> bool {
        self.whole_line
    }
}

/// One pattern source as handed to the compiler: its raw blob and where it
/// came from (`None` file means an inline `-e`/positional argument, which
/// has no filename to report in error messages).
pub struct PatternSource {
    pub blob: Vec<u8>,
    pub file: Option<String>,
}

/// Compile a set of pattern sources into a [`PatternSet`] (§4.A).
///
/// Each source blob is split on `eol` into individual patterns, each
/// compiled separately so a syntax error is reported against the specific
/// pattern (and file:line) that caused it, per the side-mapping the spec
/// describes. All patterns are then normalized to one target dialect and
/// joined by alternation for the DFA pass, while the un-joined per-pattern
/// forms remain available as the regex array for back-reference and
/// whole-word/whole-line re-verification.
pub fn compile(
    sources: &[PatternSource],
    dialect: Dialect,
    eol: u8,
    opts: CompileOptions,
) -> Result<PatternSet, Error> {
    let mut patterns: Vec<String> = Vec::new();
    let mut spans: Vec<SourceSpan> = Vec::new();

    for source in sources {
        let text = String::from_utf8_lossy(&source.blob);
        let mut line_no = 0usize;
        for raw in split_on_eol(&text, eol as char) {
            line_no += 1;
            if raw.is_empty() && sources.len() > 1 {
                continue;
            }
            let normalized = normalize_one(raw, dialect, opts.ignore_case)?;
            patterns.push(normalized);
            spans.push(SourceSpan {
                file: source.file.clone(),
                line: source.file.as_ref().map(|_| line_no),
            });
        }
    }

    if patterns.is_empty() {
        patterns.push(String::new());
        spans.push(SourceSpan {
            file: None,
            line: None,
        });
    }

    let has_backref = patterns.iter().any(|p| has_backreference(p));

    let regex_array = patterns
        .iter()
        .zip(spans.iter())
        .map(|(pattern, span)| {
            let pat_has_backref = has_backreference(pattern);
            BackrefPattern::compile(pattern, opts.ignore_case, pat_has_backref).map_err(|e| {
                reattach_location(e, pattern, span)
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let joined = join_alternation(&patterns);
    let wrapped = wrap_boundaries(&joined, opts.whole_word, opts.whole_line);

    let dfa = Dfa::compile(&wrapped, eol, opts.ignore_case, has_backref)
        .map_err(|e| reattach_location(e, &wrapped, &spans[0]))?;

    let kwset = KeywordSet::build(dfa.must_list().to_vec(), eol);

    Ok(PatternSet {
        dfa,
        kwset,
        regex_array,
        has_backref,
        whole_word: opts.whole_word,
        whole_line: opts.whole_line,
    })
}

fn normalize_one(raw: &str, dialect: Dialect, ignore_case: bool) -> Result<String, Error> {
    let mut normalized = dialect.normalize(raw);
    if dialect == Dialect::Fixed && ignore_case && has_invalid_encoding(raw) {
        // §4.A deterministic choice: fixed-strings promoted to basic when
        // ignore_case isn't cheaply achievable over an encoding-broken
        // pattern; the literal is already escaped, so re-running it through
        // the basic->extended translator is a no-op beyond re-validation.
        normalized = Dialect::Basic.normalize(&normalized);
    }
    Ok(normalized)
}

fn has_invalid_encoding(s: &str) -> bool {
    // `raw` is always a valid `&str` slice of a lossily-decoded blob; any
    // replacement character marks a byte sequence that was invalid in the
    // source encoding.
    s.contains('\u{FFFD}')
}

fn split_on_eol(text: &str, eol: char) -> Vec<&str> {
    if text.is_empty() {
        return vec![""];
    }
    let trimmed = text.strip_suffix(eol).unwrap_or(text);
    trimmed.split(eol).collect()
}

fn join_alternation(patterns: &[String]) -> String {
    if patterns.len() == 1 {
        return patterns[0].clone();
    }
    patterns
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Wrap the joined pattern in boundary assertions for `-w`/`-x` (§4.A): the
/// DFA pass enforces the boundary so it can reject fast; the regex array
/// re-verifies per pattern during cascade step 4, since a DFA-level wrapper
/// cannot tell the engine which alternative actually matched.
fn wrap_boundaries(joined: &str, whole_word: bool, whole_line: bool) -> String {
    if whole_line {
        format!("^(?:{joined})$")
    } else if whole_word {
        format!(r"(?:\b)(?:{joined})(?:\b)")
    } else {
        joined.to_string()
    }
}

fn reattach_location(err: Error, pattern: &str, span: &SourceSpan) -> Error {
    match err {
        Error::PatternSyntax { message, .. } => {
            let prefix = pattern_loc_prefix(span.file.as_deref(), span.line);
            Error::PatternSyntax {
                pattern: pattern.to_string(),
                file: span.file.clone(),
                line: span.line,
                message: format!("{prefix}{message}"),
            }
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
