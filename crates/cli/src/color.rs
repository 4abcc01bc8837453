// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Color-choice resolution and the capability-to-`ColorSpec` mapping the
//! line printer (§4.D) draws on.
//!
//! SGR escape generation itself is out of scope (§1); we consume it
//! through `termcolor`'s narrow `ColorSpec`/`WriteColor` interface, the way
//! the teacher's `color.rs` does for its own fixed palette. Here the
//! palette is not fixed — it's driven by the `GREP_COLORS` dictionary
//! (`crate::env::ColorCapabilities`).

use std::io::IsTerminal;

use termcolor::{Color, ColorChoice, ColorSpec};

use crate::env::ColorCapabilities;

/// Resolve color choice from CLI flags, matching the teacher's priority
/// chain: explicit `--no-color` > explicit `--color` > auto-detect via
/// `IsTerminal`.
pub fn resolve_color(force_color: bool, no_color: bool) -> ColorChoice {
    if no_color {
        return ColorChoice::Never;
    }
    if force_color {
        return ColorChoice::Always;
    }
    if !std::io::stdout().is_terminal() {
        return ColorChoice::Never;
    }
    ColorChoice::Auto
}

/// Decode one `GREP_COLORS` SGR code string (e.g. `"01;31"`) into a
/// `ColorSpec`. Unknown numeric codes are ignored rather than rejected.
pub fn spec_for_code(code: &str) -> ColorSpec {
    let mut spec = ColorSpec::new();
    if code.is_empty() {
        return spec;
    }
    for part in code.split(';') {
        match part.parse::<u8>() {
            Ok(0) => spec = ColorSpec::new(),
            Ok(1) => {
                spec.set_bold(true);
            }
            Ok(4) => {
                spec.set_underline(true);
            }
            Ok(7) => {
                spec.set_reverse(true);
            }
            Ok(n @ 30..=37) => {
                spec.set_fg(Some(ansi_color(n - 30)));
            }
            Ok(n @ 40..=47) => {
                spec.set_bg(Some(ansi_color(n - 40)));
            }
            Ok(n @ 90..=97) => {
                spec.set_fg(Some(ansi_color(n - 90))).set_intense(true);
            }
            Ok(n @ 100..=107) => {
                spec.set_bg(Some(ansi_color(n - 100))).set_intense(true);
            }
            _ => {}
        }
    }
    spec
}

fn ansi_color(n: u8) -> Color {
    match n {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::White,
    }
}

/// Resolved color scheme for one search: each head field and the match
/// itself get their own `ColorSpec`, derived from the `GREP_COLORS`
/// dictionary the way GNU grep's `grep.c` resolves the same selectors
/// (`fn`, `ln`, `se`, `mt`/`ms`/`mc`).
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub filename: ColorSpec,
    pub line_number: ColorSpec,
    pub separator: ColorSpec,
    pub matched: ColorSpec,
}

impl ColorScheme {
    pub fn from_capabilities(caps: &ColorCapabilities) -> Self {
        let matched = caps
            .get("mt")
            .or_else(|| caps.get("ms"))
            .map(spec_for_code)
            .unwrap_or_else(|| spec_for_code("01;31"));
        Self {
            filename: caps
                .get("fn")
                .map(spec_for_code)
                .unwrap_or_else(|| spec_for_code("35")),
            line_number: caps
                .get("ln")
                .map(spec_for_code)
                .unwrap_or_else(|| spec_for_code("32")),
            separator: caps
                .get("se")
                .map(spec_for_code)
                .unwrap_or_else(|| spec_for_code("36")),
            matched,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::from_capabilities(&ColorCapabilities::default())
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
