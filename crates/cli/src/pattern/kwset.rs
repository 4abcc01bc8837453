// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Keyword Set (§3, §4.A, §4.B step 1): a Boyer-Moore-style multi-string
//! prefilter built from the DFA's `must_list`.
//!
//! `aho-corasick` is this crate's Boyer-Moore-style multi-keyword matcher —
//! its `AhoCorasickKind::DFA`/Teddy backends are exactly the class of
//! algorithm GNU grep's own `kwset.c` implements by hand. Grounded on the
//! teacher's `pattern/matcher.rs::MultiLiteralMatcher`, generalized from "one
//! matcher kind among several" to "the mandatory first stage of every
//! search".

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

/// One fixed string the DFA proved must appear in any match (§3 Must-list).
#[derive(Debug, Clone)]
pub struct MustString {
    pub text: Vec<u8>,
    /// Confirms the whole regex on its own — no further engine needed.
    pub exact: bool,
    /// Must appear anchored to the start of the line.
    pub begin_line: bool,
    /// Must appear anchored to the end of the line.
    pub end_line: bool,
}

/// A compiled multi-string prefilter over a DFA's must-list.
///
/// Invariant (§3): `exact_match_count <= kwset.len()`. Entries are stored
/// with the exact ones first so a successful match's pattern index can be
/// compared against `exact_match_count` in O(1) to tell exact from
/// filter-only.
pub struct KeywordSet {
    automaton: AhoCorasick,
    entries: Vec<MustString>,
    exact_match_count: usize,
    eol: u8,
}

/// What a keyword-set hit tells the match engine.
#[derive(Debug, Clone, Copy)]
pub struct KeywordHit {
    /// Byte offset of the match start within the searched window.
    pub start: usize,
    pub end: usize,
    /// Whether this entry alone confirms the whole regex (§4.B step 1).
    pub exact: bool,
}

impl KeywordSet {
    /// Build from a must-list, padding exact entries with the end-of-line
    /// byte on either side when their begin-line/end-line flags are set
    /// (§4.A).
    pub fn build(mut must_list: Vec<MustString>, eol: u8) -> Option<Self> {
        if must_list.is_empty() {
            return None;
        }
        must_list.sort_by_key(|m| !m.exact);
        let exact_match_count = must_list.iter().filter(|m| m.exact).count();

        let patterns: Vec<Vec<u8>> = must_list
            .iter()
            .map(|m| {
                if m.exact {
                    let mut padded = Vec::with_capacity(m.text.len() + 2);
                    if m.begin_line {
                        padded.push(eol);
                    }
                    padded.extend_from_slice(&m.text);
                    if m.end_line {
                        padded.push(eol);
                    }
                    padded
                } else {
                    m.text.clone()
                }
            })
            .collect();

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&patterns)
            .ok()?;

        Some(Self {
            automaton,
            entries: must_list,
            exact_match_count,
            eol,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exact_match_count(&self) -> usize {
        self.exact_match_count
    }

    /// Run the prefilter over `haystack`, returning the first hit (§4.B
    /// step 1: "On failure, return no match").
    pub fn find(&self, haystack: &[u8]) -> Option<KeywordHit> {
        let m = self.automaton.find(haystack)?;
        let idx = m.pattern().as_usize();
        let exact = idx < self.exact_match_count;
        // The padded exact entries include the bracketing eol bytes in the
        // match span; report the span of the underlying text to the caller,
        // which already knows from `exact` whether line bounds were proven.
        let entry = &self.entries[idx];
        let start = if exact && entry.begin_line {
            m.start() + 1
        } else {
            m.start()
        };
        let end = if exact && entry.end_line {
            m.end().saturating_sub(1)
        } else {
            m.end()
        };
        Some(KeywordHit { start, end, exact })
    }

    pub fn eol(&self) -> u8 {
        self.eol
    }
}

#[cfg(test)]
#[path = "kwset_tests.rs"]
mod tests;
