// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Match Engine (§4.B): runs the keyword prefilter, superset DFA,
//! primary DFA, and back-reference-capable regex array in a fixed cascade
//! order over the window the buffer manager hands it, returning the next
//! matching line's span or "no match".
//!
//! Grounded on the teacher's `pattern/matcher.rs::CompiledPattern` dispatch
//! (pick a fast path if the shape allows, otherwise fall through to the
//! general regex), generalized from "one of several matcher kinds, picked
//! once" into "a fixed four-stage cascade run on every search".

use crate::pattern::PatternSet;

/// One matched line span within a search window, plus the narrower
/// sub-span of the match itself (used by the line printer's middle phase
/// for colorization and `-o`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch {
    /// Start of the line containing the match (offset into the haystack).
    pub line_start: usize,
    /// End of the line, exclusive of its end-of-line byte.
    pub line_end: usize,
    /// Start of the match itself within the haystack.
    pub match_start: usize,
    pub match_end: usize,
}

/// One keyword-prefilter hit (§4.B step 1): the line it falls on, the
/// hit's own span within that line, and whether the hit alone confirms
/// the whole regex.
struct PrefilterHit {
    line_start: usize,
    line_end: usize,
    hit_start: usize,
    hit_end: usize,
    exact: bool,
}

/// The layered matcher (§4.B). Owns no buffer; it is handed a haystack
/// slice and a search window on each call, exactly as the spec's
/// `(begin, size)` / `match_size` / `start_ptr` signature describes.
pub struct MatchEngine<'p> {
    patterns: &'p PatternSet,
    eol: u8,
}

impl<'p> MatchEngine<'p> {
    pub fn new(patterns: &'p PatternSet, eol: u8) -> Self {
        Self { patterns, eol }
    }

    /// Find the next matching line at or after `start`, within
    /// `haystack[..end]`. `start_ptr`, when given, additionally requests
    /// that the match be re-verified as beginning exactly at that position
    /// (used by whole-line/whole-word exact-match probing), forcing the
    /// cascade straight to the regex array (§4.B step 4).
    pub fn find(&self, haystack: &[u8], start: usize, end: usize, start_ptr: Option<usize>) -> Option<LineMatch> {
        if let Some(ptr) = start_ptr {
            return self.regex_array_probe(haystack, ptr, end);
        }

        let mut cursor = start;
        loop {
            if cursor >= end {
                return None;
            }

            let hit = match self.prefilter(haystack, cursor, end) {
                Some(hit) => hit,
                None => return None,
            };
            let (window_start, window_end, exact) = (hit.line_start, hit.line_end, hit.exact);

            if exact && !self.patterns.has_backreference() {
                return self.finish_exact(haystack, hit.hit_start, hit.hit_end, window_end);
            }

            if let Some(superset) = self.patterns.dfa().superset() {
                if !exact && superset.find(haystack, window_start, window_end).is_none() {
                    cursor = next_line_start(haystack, window_end, self.eol);
                    continue;
                }
            }

            if let Some((m_start, m_end)) = self.patterns.dfa().find(haystack, window_start, window_end) {
                if !self.patterns.has_backreference() {
                    return Some(self.to_line_match(haystack, m_start, m_end, end));
                }
            }

            // Regex array: only reached when the DFA needed back-reference
            // interaction to decide this window (§4.B step 4). `start_ptr`
            // is the other entry point and returns above before this loop
            // ever runs.
            if self.patterns.has_backreference() {
                if let Some(m) = self.regex_array_search(haystack, window_start, window_end) {
                    return Some(m);
                }
            }

            cursor = next_line_start(haystack, window_end, self.eol);
        }
    }

    /// Cascade step 1: the keyword prefilter. Returns the line-bounded
    /// window to continue searching, the hit's own span, and whether the
    /// hit was exact.
    fn prefilter(&self, haystack: &[u8], start: usize, end: usize) -> Option<PrefilterHit> {
        let Some(kwset) = self.patterns.keyword_set() else {
            return Some(PrefilterHit {
                line_start: start,
                line_end: end,
                hit_start: start,
                hit_end: start,
                exact: false,
            });
        };
        // Begin-line-anchored exact entries are padded with the eol byte
        // (§4.A, kwset.rs); search one byte further back than `start` so a
        // match sitting right at `start` can still see the sentinel eol the
        // buffer manager guarantees precedes it (§4.C invariant i). A
        // begin-line entry's reported start always lands at or after
        // `start` (the padding byte is consumed by the match but stripped
        // from the reported span); any other hit that lands in that extra
        // byte is a non-anchored entry matching before the caller's actual
        // search start and must be discarded by re-searching from `start`.
        let search_start = start.saturating_sub(1);
        let hit = kwset.find(&haystack[search_start..end])?;
        let (abs_start, abs_end, exact) = if search_start + hit.start < start {
            let hit = kwset.find(&haystack[start..end])?;
            (start + hit.start, start + hit.end, hit.exact)
        } else {
            (search_start + hit.start, search_start + hit.end, hit.exact)
        };

        let line_start = scan_back_to_line_start(haystack, abs_start, self.eol);
        let mut line_end = scan_forward_to_line_end(haystack, abs_end, end, self.eol);

        if self.patterns.dfa().is_fast() && !exact {
            let extended = line_start + 4 * (abs_end - line_start).max(1);
            line_end = line_end.max(extended.min(end));
        }

        Some(PrefilterHit {
            line_start,
            line_end,
            hit_start: abs_start,
            hit_end: abs_end,
            exact,
        })
    }

    /// A keyword hit marked `exact` fully confirms the regex by itself
    /// (§3 Must-list: "confirms the whole regex on its own"); the hit's own
    /// span is the match, so no further engine call is needed. Crucially
    /// this must NOT re-run the DFA over the whole line — a line with more
    /// than one occurrence of the literal would otherwise always resolve
    /// to the first one, regardless of which occurrence the cascade
    /// actually found, breaking per-match iteration within a line.
    fn finish_exact(&self, haystack: &[u8], hit_start: usize, hit_end: usize, end: usize) -> Option<LineMatch> {
        Some(self.to_line_match(haystack, hit_start, hit_end, end))
    }

    fn to_line_match(&self, haystack: &[u8], m_start: usize, m_end: usize, end: usize) -> LineMatch {
        let line_start = scan_back_to_line_start(haystack, m_start, self.eol);
        let line_end = scan_forward_to_line_end(haystack, m_end, end, self.eol);
        LineMatch {
            line_start,
            line_end,
            match_start: m_start,
            match_end: m_end.max(m_start),
        }
    }

    /// Cascade step 4, run over a whole candidate window: leftmost-then-
    /// longest match across the pattern array (§4.B tie-breaking).
    fn regex_array_search(&self, haystack: &[u8], start: usize, end: usize) -> Option<LineMatch> {
        let mut best: Option<(usize, usize)> = None;
        for pat in self.patterns.regex_array() {
            if let Some((m_start, m_end)) = pat.find_at(haystack, start, end) {
                best = Some(match best {
                    Some((b_start, b_end)) => pick_better(b_start, b_end, m_start, m_end),
                    None => (m_start, m_end),
                });
            }
        }
        let (m_start, m_end) = best?;
        if self.patterns.whole_word() && !is_word_bounded(haystack, m_start, m_end) {
            return self.regex_array_search_word_retry(haystack, m_start, end);
        }
        Some(self.to_line_match(haystack, m_start, m_end, end))
    }

    /// `-w` retry per §4.B step 4: shrink-then-advance until a word-bounded
    /// candidate is found or the window is exhausted.
    fn regex_array_search_word_retry(&self, haystack: &[u8], from: usize, end: usize) -> Option<LineMatch> {
        let mut cursor = from + 1;
        while cursor < end {
            if let Some(m) = self.regex_array_search(haystack, cursor, end) {
                return Some(m);
            }
            cursor += 1;
        }
        None
    }

    /// Used by `start_ptr`-driven exact probing: verify the regex array
    /// matches exactly the span `[ptr, line end)` (§4.B whole-line mode).
    fn regex_array_probe(&self, haystack: &[u8], ptr: usize, end: usize) -> Option<LineMatch> {
        let line_end = scan_forward_to_line_end(haystack, ptr, end, self.eol);
        for pat in self.patterns.regex_array() {
            if self.patterns.whole_line() {
                if pat.matches_exact_span(haystack, ptr, line_end) {
                    return Some(LineMatch {
                        line_start: ptr,
                        line_end,
                        match_start: ptr,
                        match_end: line_end,
                    });
                }
            } else if let Some((m_start, m_end)) = pat.find_at(haystack, ptr, line_end) {
                return Some(self.to_line_match(haystack, m_start, m_end, end));
            }
        }
        None
    }
}

fn pick_better(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> (usize, usize) {
    if b_start < a_start || (b_start == a_start && b_end > a_end) {
        (b_start, b_end)
    } else {
        (a_start, a_end)
    }
}

/// Unicode-aware, to match the DFA's own `\b` wrapper (compiler.rs wraps
/// `-w` patterns with `\b`, compiled with `.unicode(true)` in dfa.rs) —
/// an ASCII-only check here would accept matches the DFA already
/// rejected, e.g. `-w cat` against `catédral` (`é` is a word character
/// under Unicode `\b`, so there is no boundary after `cat`).
fn is_word_bounded(haystack: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !is_word_char(decode_char_before(haystack, start));
    let after_ok = end >= haystack.len() || !is_word_char(decode_char_at(haystack, end));
    before_ok && after_ok
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Decode the UTF-8 scalar value ending at `pos`, scanning back at most
/// four bytes to find its lead byte.
fn decode_char_before(haystack: &[u8], pos: usize) -> Option<char> {
    let lower = pos.saturating_sub(4);
    let mut start = pos - 1;
    while start > lower && haystack[start] & 0b1100_0000 == 0b1000_0000 {
        start -= 1;
    }
    std::str::from_utf8(&haystack[start..pos]).ok()?.chars().next_back()
}

/// Decode the UTF-8 scalar value starting at `pos`.
fn decode_char_at(haystack: &[u8], pos: usize) -> Option<char> {
    let lead = *haystack.get(pos)?;
    let len = if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    };
    let end = (pos + len).min(haystack.len());
    std::str::from_utf8(&haystack[pos..end]).ok()?.chars().next()
}

fn scan_back_to_line_start(haystack: &[u8], from: usize, eol: u8) -> usize {
    let mut i = from;
    while i > 0 {
        if haystack[i - 1] == eol {
            return i;
        }
        i -= 1;
    }
    0
}

fn scan_forward_to_line_end(haystack: &[u8], from: usize, limit: usize, eol: u8) -> usize {
    let mut i = from.min(limit);
    while i < limit {
        if haystack[i] == eol {
            return i;
        }
        i += 1;
    }
    limit
}

/// Cascade failure-recovery: advance past the current line (including its
/// end-of-line byte) to resume the search loop. Guarantees progress even
/// for an empty match (§4.B tie-breaking: "empty matches advance the
/// cursor by at least one byte").
fn next_line_start(haystack: &[u8], from: usize, eol: u8) -> usize {
    let mut i = from;
    if i < haystack.len() && haystack[i] == eol {
        i += 1;
    } else {
        i = (i + 1).min(haystack.len());
    }
    i
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
