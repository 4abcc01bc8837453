// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variables consulted by the driver (§6 Environment).
//!
//! `GREP_COLORS`/`GREP_COLOR` feed the line printer's color dictionary;
//! `POSIXLY_CORRECT` elevates certain DFA warnings to hard errors;
//! `GREP_OPTIONS` is expanded into the argument vector before `clap` ever
//! sees it.

use std::collections::BTreeMap;

/// Default `GREP_COLORS` dictionary, matching GNU grep's built-in default.
const DEFAULT_GREP_COLORS: &str =
    "sl=:cx=:rv:mt=01;31:ms=01;31:mc=01;31:fn=35:ln=32:se=36:sa=:bn=32:hn=32:se=36";

/// A parsed `GREP_COLORS` capability dictionary: selector -> SGR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCapabilities {
    codes: BTreeMap<String, String>,
}

impl ColorCapabilities {
    /// Parse from the `GREP_COLORS` env var, if set; otherwise fall back to
    /// the built-in default dictionary, then overlay the legacy `GREP_COLOR`
    /// var (a single SGR code that overrides just the match capability).
    pub fn from_env() -> Self {
        let spec = std::env::var("GREP_COLORS").unwrap_or_else(|_| DEFAULT_GREP_COLORS.to_string());
        let mut caps = Self::parse(&spec);
        if let Ok(legacy) = std::env::var("GREP_COLOR") {
            if !legacy.is_empty() {
                caps.codes.insert("mt".to_string(), legacy);
            }
        }
        caps
    }

    /// Parse a `sel=N[;N...]:sel=N...` dictionary string. Unknown or
    /// malformed fields are skipped rather than rejected, matching GNU
    /// grep's tolerant parser.
    pub fn parse(spec: &str) -> Self {
        let mut codes = BTreeMap::new();
        for field in spec.split(':') {
            if field.is_empty() {
                continue;
            }
            match field.split_once('=') {
                Some((sel, code)) => {
                    codes.insert(sel.to_string(), code.to_string());
                }
                None => {
                    // Boolean-style fields like `rv` carry no `=value`.
                    codes.insert(field.to_string(), String::new());
                }
            }
        }
        Self { codes }
    }

    /// Look up the SGR code for a capability selector (e.g. `"mt"`, `"fn"`).
    pub fn get(&self, selector: &str) -> Option<&str> {
        self.codes.get(selector).map(String::as_str)
    }

    /// Whether the `rv` (reverse video for `-v` context) flag is set.
    pub fn reverse_video(&self) -> bool {
        self.codes.contains_key("rv")
    }
}

impl Default for ColorCapabilities {
    fn default() -> Self {
        Self::parse(DEFAULT_GREP_COLORS)
    }
}

/// Whether `POSIXLY_CORRECT` is set, elevating certain DFA warnings to
/// fatal pattern-syntax errors (§4.A Deterministic choices; §7).
pub fn posixly_correct() -> bool {
    std::env::var_os("POSIXLY_CORRECT").is_some()
}

/// Expand the deprecated `GREP_OPTIONS` environment variable into a
/// shell-word-split argument prefix, placed ahead of the real
/// `std::env::args()` the way GNU grep prepends it. Logs once at debug
/// level when used, matching the teacher's habit of logging back-compat
/// code paths.
pub fn expand_grep_options(argv0: String, rest: Vec<String>) -> Vec<String> {
    let Ok(opts) = std::env::var("GREP_OPTIONS") else {
        let mut args = vec![argv0];
        args.extend(rest);
        return args;
    };
    if opts.trim().is_empty() {
        let mut args = vec![argv0];
        args.extend(rest);
        return args;
    }
    tracing::debug!("GREP_OPTIONS is deprecated; prepending: {opts}");
    let mut args = vec![argv0];
    args.extend(split_shell_words(&opts));
    args.extend(rest);
    args
}

/// Minimal whitespace word-splitter for `GREP_OPTIONS`. GNU grep's own
/// handling is similarly naive (no quoting support); we match that rather
/// than inventing a richer shell-quoting grammar for a deprecated variable.
fn split_shell_words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
