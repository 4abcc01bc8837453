// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The compiled DFA (§3, §4.A): a deterministic automaton over the
//! concatenation of all patterns joined by alternation, plus its
//! `is_fast` hint, optional superset DFA, and `must_list`.
//!
//! `regex-automata`'s `meta::Regex` is used as the DFA engine proper — it
//! internally picks a dense/lazy/one-pass DFA depending on pattern shape,
//! which is exactly the class of engine this pack's `thomcc-regex-automata`
//! repo implements. Literal must-list extraction uses
//! `regex_syntax::hir::literal::Extractor`, the same technique ripgrep's own
//! matcher crate uses (see `other_examples/…ripgrep__crates-regex-src-matcher.rs.rs`).

use regex_automata::meta::Regex as MetaRegex;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input};
use regex_syntax::hir::literal::{Extractor, ExtractKind};
use regex_syntax::hir::Hir;

use crate::error::Error;
use crate::pattern::kwset::MustString;

/// A compiled DFA over the union of the pattern set.
pub struct Dfa {
    engine: MetaRegex,
    /// Single-byte locale optimization hint (§3). We approximate this as
    /// "the pattern compiles to a single-pass/dense DFA with no Unicode
    /// word boundaries", which is the condition under which the keyword
    /// prefilter's greedy 4x extension (§4.B step 1) is safe to take.
    is_fast: bool,
    /// A looser DFA accepting a superset of the language, built by
    /// replacing back-reference tokens with a wildcard (§3). Present only
    /// when the source pattern contained a back-reference.
    superset: Option<Box<Dfa>>,
    must_list: Vec<MustString>,
}

impl Dfa {
    /// Compile the (already dialect-normalized, ERE/Rust-flavored) joined
    /// pattern. `has_backref` is decided by the caller (§4.A pattern
    /// compiler), since it needs the pre-normalization source to detect
    /// `\N` reliably across dialects.
    pub fn compile(joined: &str, eol: u8, case_insensitive: bool, has_backref: bool) -> Result<Self, Error> {
        // `multi_line(true)` makes `^`/`$` anchor to line boundaries (the
        // preceding/following byte, wherever the search range starts)
        // rather than absolute haystack start/end — the semantics every
        // line-oriented match needs, and the one that lets `-x`'s
        // `^(?:...)$ ` wrapper (§4.A) key off the buffer manager's sentinel
        // invariant (§4.C invariant i) instead of an absolute offset.
        let syntax_cfg = syntax::Config::new()
            .case_insensitive(case_insensitive)
            .multi_line(true)
            .unicode(true);

        let superset = if has_backref {
            let superset_pattern = super::backrefs::strip_to_superset(joined);
            let engine = build_engine(&superset_pattern, syntax_cfg)?;
            let hir = parse_hir(&superset_pattern, case_insensitive)?;
            let must_list = extract_must_list(&hir, eol);
            Some(Box::new(Dfa {
                engine,
                is_fast: false,
                superset: None,
                must_list,
            }))
        } else {
            None
        };

        // The primary DFA is only ever consulted when there is no
        // back-reference in the pattern (§4.B step 3 requires "a match
        // without back-reference interaction"); when a back-reference is
        // present we still compile a best-effort primary DFA over the
        // superset pattern so cascade step 2/3 have something fast to run,
        // but acceptance there never bypasses the regex-array step for
        // such patterns (enforced by the caller, not this type).
        let primary_source = if has_backref {
            super::backrefs::strip_to_superset(joined)
        } else {
            joined.to_string()
        };
        let engine = build_engine(&primary_source, syntax_cfg)?;
        let hir = parse_hir(&primary_source, case_insensitive)?;
        let must_list = extract_must_list(&hir, eol);
        let is_fast = !case_insensitive && hir.properties().is_utf8();

        Ok(Dfa {
            engine,
            is_fast,
            superset,
            must_list,
        })
    }

    pub fn is_fast(&self) -> bool {
        self.is_fast
    }

    pub fn must_list(&self) -> &[MustString] {
        &self.must_list
    }

    pub fn superset(&self) -> Option<&Dfa> {
        self.superset.as_deref()
    }

    /// Execute the DFA over `haystack[start..end]`-relative-to-0 absolute
    /// positions, returning the leftmost-then-longest match span, if any.
    pub fn find(&self, haystack: &[u8], start: usize, end: usize) -> Option<(usize, usize)> {
        let input = Input::new(haystack).range(start..end).anchored(Anchored::No);
        let m = self.engine.find(input)?;
        Some((m.start(), m.end()))
    }

    /// Whether `haystack[start..end]` matches the DFA as a whole span
    /// (used for `-x` whole-line probing at a known position).
    pub fn is_match_at(&self, haystack: &[u8], start: usize, end: usize) -> bool {
        let input = Input::new(haystack).range(start..end).anchored(Anchored::Yes);
        self.engine.is_match(input)
    }
}

fn build_engine(pattern: &str, cfg: syntax::Config) -> Result<MetaRegex, Error> {
    MetaRegex::builder()
        .syntax(cfg)
        .build(pattern)
        .map_err(|e| Error::PatternSyntax {
            pattern: pattern.to_string(),
            file: None,
            line: None,
            message: format!("invalid pattern `{pattern}`: {e}"),
        })
}

fn parse_hir(pattern: &str, case_insensitive: bool) -> Result<Hir, Error> {
    regex_syntax::ParserBuilder::new()
        .case_insensitive(case_insensitive)
        .build()
        .parse(pattern)
        .map_err(|e| Error::PatternSyntax {
            pattern: pattern.to_string(),
            file: None,
            line: None,
            message: format!("invalid pattern `{pattern}`: {e}"),
        })
}

/// Extract the must-list (§3) from a pattern's HIR: literal substrings
/// that must appear in any accepted string. We use prefix/suffix
/// extraction (not full inner-literal analysis, which ripgrep's
/// `grep-regex` crate implements as a bespoke pass) as the necessary-
/// condition substrings for the keyword prefilter; begin/end-line flags
/// come from whether the pattern's outermost look-around requires
/// start/end-of-haystack at that edge.
fn extract_must_list(hir: &Hir, eol: u8) -> Vec<MustString> {
    let _ = eol;
    let prefixes = Extractor::new().kind(ExtractKind::Prefix).extract(hir);
    let exact = prefixes.is_exact();
    let anchored_start = pattern_anchored_start(hir);
    let anchored_end = pattern_anchored_end(hir);

    let Some(lits) = prefixes.literals() else {
        return Vec::new();
    };

    lits.iter()
        .filter(|l| !l.as_bytes().is_empty())
        .map(|l| MustString {
            text: l.as_bytes().to_vec(),
            exact,
            begin_line: exact && anchored_start,
            end_line: exact && anchored_end,
        })
        .collect()
}

fn pattern_anchored_start(hir: &Hir) -> bool {
    hir.properties().look_set_prefix().contains(regex_syntax::hir::Look::Start)
}

fn pattern_anchored_end(hir: &Hir) -> bool {
    hir.properties().look_set_suffix().contains(regex_syntax::hir::Look::End)
}

#[cfg(test)]
#[path = "dfa_tests.rs"]
mod tests;
