// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::env::ColorCapabilities;

#[test]
fn resolve_color_no_color_wins_over_force() {
    assert_eq!(resolve_color(true, true), ColorChoice::Never);
}

#[test]
fn resolve_color_force_wins_over_auto_detect() {
    assert_eq!(resolve_color(true, false), ColorChoice::Always);
}

#[test]
fn spec_for_code_bold_red_is_mt_default() {
    let spec = spec_for_code("01;31");
    assert!(spec.bold());
    assert_eq!(spec.fg(), Some(&Color::Red));
}

#[test]
fn spec_for_code_ignores_unknown_numbers() {
    let spec = spec_for_code("255");
    assert!(!spec.bold());
    assert_eq!(spec.fg(), None);
}

#[test]
fn spec_for_code_empty_is_plain() {
    let spec = spec_for_code("");
    assert_eq!(spec, ColorSpec::new());
}

#[test]
fn scheme_from_default_capabilities_has_red_bold_match() {
    let scheme = ColorScheme::from_capabilities(&ColorCapabilities::default());
    assert!(scheme.matched.bold());
    assert_eq!(scheme.matched.fg(), Some(&Color::Red));
}

#[test]
fn scheme_honors_custom_mt() {
    let caps = ColorCapabilities::parse("mt=01;34");
    let scheme = ColorScheme::from_capabilities(&caps);
    assert_eq!(scheme.matched.fg(), Some(&Color::Blue));
}
