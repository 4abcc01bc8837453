// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The regex-array fallback (§4.B step 4): the only step reached when the
//! DFA required back-reference interaction, or when an exact-match probe
//! at a specific `start_ptr` is needed.
//!
//! No pack repo ships a reusable backtracking-with-backreferences
//! *library*; `defuz-regex` shows the shape such an engine takes
//! internally (NFA + backtrack VM), which is what justified reaching for
//! `fancy-regex` here rather than writing one from scratch — see
//! DESIGN.md. The cascade role this module plays (iterate patterns,
//! leftmost-then-longest, whole-line/whole-word re-verification) mirrors
//! `defuz-regex`'s own `backtrack.rs`, just built on a maintained engine.

use fancy_regex::Regex as FancyRegex;

use crate::error::Error;

/// One compiled pattern in the regex array, plus whether it actually needs
/// back-tracking (has a back-reference) — patterns without one still live
/// here so whole-line/whole-word re-verification can iterate the full
/// array uniformly (§4.B step 4).
pub struct BackrefPattern {
    regex: FancyRegex,
    pub has_backref: bool,
}

impl BackrefPattern {
    pub fn compile(pattern: &str, case_insensitive: bool, has_backref: bool) -> Result<Self, Error> {
        let prefixed = if case_insensitive {
            format!("(?i){pattern}")
        } else {
            pattern.to_string()
        };
        let regex = FancyRegex::new(&prefixed).map_err(|e| Error::PatternSyntax {
            pattern: pattern.to_string(),
            file: None,
            line: None,
            message: format!("invalid pattern `{pattern}`: {e}"),
        })?;
        Ok(Self { regex, has_backref })
    }

    /// Find the leftmost match at or after `start` within `haystack[..end]`.
    pub fn find_at(&self, haystack: &[u8], start: usize, end: usize) -> Option<(usize, usize)> {
        let text = std::str::from_utf8(&haystack[..end]).ok()?;
        let char_start = byte_to_char_floor(text, start);
        let m = self.regex.find_from_pos(text, char_start).ok().flatten()?;
        Some((m.start(), m.end()))
    }

    /// Whether `haystack[start..end]` matches the pattern anchored to
    /// exactly that span (§4.B step 4 whole-line verification).
    pub fn matches_exact_span(&self, haystack: &[u8], start: usize, end: usize) -> bool {
        match std::str::from_utf8(&haystack[start..end]) {
            Ok(text) => match self.regex.find(text) {
                Ok(Some(m)) => m.start() == 0 && m.end() == text.len(),
                _ => false,
            },
            Err(_) => false,
        }
    }
}

/// Clamp a byte offset down to the nearest UTF-8 character boundary; used
/// because `fancy-regex` operates on `&str`, not arbitrary byte ranges.
fn byte_to_char_floor(text: &str, byte_offset: usize) -> usize {
    let mut last_ok = 0;
    for (i, _) in text.char_indices() {
        if i > byte_offset {
            break;
        }
        last_ok = i;
    }
    last_ok
}

/// Replace every back-reference token `\1`..`\9` with a non-greedy wildcard,
/// producing a pattern whose accepted language is a strict superset of the
/// original (§3 DFA `superset`). Used only to build a fast, back-reference-
/// free DFA that can rule out non-matches before the slow fallback runs.
pub fn strip_to_superset(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() && chars[i + 1] != '0' {
            out.push_str(".*?");
            i += 2;
        } else if chars[i] == '\\' && i + 1 < chars.len() {
            out.push(chars[i]);
            out.push(chars[i + 1]);
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
#[path = "backrefs_tests.rs"]
mod tests;
