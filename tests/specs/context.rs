//! `-A`/`-B`/`-C` context bracketing and the `--` group separator (§4.D).

use super::prelude::*;

#[test]
fn before_and_after_context_bracket_the_match() {
    let (_dir, path) = temp_file("input.txt", "one\ntwo\nNEEDLE\nfour\nfive\n");
    ungrep_cmd()
        .args(["-B1", "-A1", "NEEDLE", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("two\nNEEDLE\nfour\n");
}

#[test]
fn context_flag_sets_both_sides_at_once() {
    let (_dir, path) = temp_file("input.txt", "one\ntwo\nNEEDLE\nfour\nfive\n");
    ungrep_cmd()
        .args(["-C1", "NEEDLE", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("two\nNEEDLE\nfour\n");
}

#[test]
fn non_adjacent_context_blocks_get_a_separator() {
    let (_dir, path) = temp_file("input.txt", "a\nNEEDLE\nb\nc\nd\nNEEDLE\ne\n");
    ungrep_cmd()
        .args(["-B1", "-A1", "NEEDLE", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("a\nNEEDLE\nb\n--\nd\nNEEDLE\ne\n");
}

#[test]
fn adjacent_context_blocks_get_no_separator() {
    let (_dir, path) = temp_file("input.txt", "NEEDLE\nmiddle\nNEEDLE\n");
    ungrep_cmd()
        .args(["-A1", "-B1", "NEEDLE", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("NEEDLE\nmiddle\nNEEDLE\n");
}
