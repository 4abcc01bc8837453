//! Pattern selection and per-line output flags (§6).

use super::prelude::*;

#[test]
fn bare_invocation_without_a_pattern_is_an_argument_error() {
    ungrep_cmd().assert().failure().code(2).stderr(predicates::str::contains("no pattern"));
}

#[test]
fn help_flag_exits_successfully() {
    ungrep_cmd().arg("--help").assert().success().stdout(predicates::str::contains("Usage:"));
}

#[test]
fn version_flag_exits_successfully() {
    ungrep_cmd().arg("--version").assert().success().stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn single_file_match_has_no_filename_prefix() {
    let (_dir, path) = temp_file("input.txt", "alpha\nbravo\ncharlie\n");
    ungrep_cmd()
        .args(["bravo", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("bravo\n");
}

#[test]
fn multiple_files_prefix_the_match_with_its_filename() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.txt", "needle\n");
    let b = write(dir.path(), "b.txt", "nothing here\n");
    let output = ungrep_cmd()
        .args(["needle", a.to_str().unwrap(), b.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}:needle\n", a.display()));
}

#[test]
fn with_filename_flag_forces_prefix_on_a_single_file() {
    let (_dir, path) = temp_file("input.txt", "needle\n");
    let output = ungrep_cmd()
        .args(["-H", "needle", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}:needle\n", path.display()));
}

#[test]
fn no_filename_flag_suppresses_prefix_across_several_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.txt", "needle\n");
    let b = write(dir.path(), "b.txt", "needle\n");
    ungrep_cmd()
        .args(["-h", "needle", a.to_str().unwrap(), b.to_str().unwrap()])
        .assert()
        .success()
        .stdout("needle\nneedle\n");
}

#[test]
fn invert_match_selects_non_matching_lines() {
    let (_dir, path) = temp_file("input.txt", "alpha\nbravo\ncharlie\n");
    ungrep_cmd()
        .args(["-v", "bravo", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("alpha\ncharlie\n");
}

#[test]
fn ignore_case_matches_regardless_of_letter_case() {
    let (_dir, path) = temp_file("input.txt", "Alpha\nBRAVO\n");
    ungrep_cmd()
        .args(["-i", "bravo", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("BRAVO\n");
}

#[test]
fn line_regexp_rejects_a_partial_line_match() {
    let (_dir, path) = temp_file("input.txt", "needle\nneedless\n");
    ungrep_cmd()
        .args(["-x", "needle", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("needle\n");
}

#[test]
fn word_regexp_rejects_a_substring_match() {
    let (_dir, path) = temp_file("input.txt", "cat\nconcatenate\n");
    ungrep_cmd()
        .args(["-w", "cat", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("cat\n");
}

#[test]
fn line_number_flag_prefixes_each_match_with_its_one_based_line() {
    let (_dir, path) = temp_file("input.txt", "alpha\nneedle\ncharlie\nneedle\n");
    ungrep_cmd()
        .args(["-n", "needle", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("2:needle\n4:needle\n");
}

#[test]
fn only_matching_prints_just_the_matched_span() {
    let (_dir, path) = temp_file("input.txt", "foobar needle baz\n");
    ungrep_cmd()
        .args(["-o", "needle", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("needle\n");
}

#[test]
fn count_flag_reports_a_total_instead_of_lines() {
    let (_dir, path) = temp_file("input.txt", "a\nb\na\na\n");
    ungrep_cmd()
        .args(["-c", "a", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn max_count_stops_after_the_requested_number_of_matches() {
    let (_dir, path) = temp_file("input.txt", "a\na\na\na\n");
    ungrep_cmd()
        .args(["-m", "2", "a", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("a\na\n");
}

#[test]
fn files_with_matches_lists_the_bare_path() {
    let (_dir, path) = temp_file("input.txt", "needle\n");
    let output = ungrep_cmd()
        .args(["-l", "needle", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", path.display()));
}

#[test]
fn files_without_match_lists_only_the_files_with_none() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.txt", "needle\n");
    let b = write(dir.path(), "b.txt", "nothing\n");
    let output = ungrep_cmd()
        .args(["-L", "needle", a.to_str().unwrap(), b.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", b.display()));
}

#[test]
fn extended_regexp_supports_alternation() {
    let (_dir, path) = temp_file("input.txt", "cat\ndog\nfish\n");
    ungrep_cmd()
        .args(["-E", "cat|dog", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("cat\ndog\n");
}

#[test]
fn fixed_strings_treats_metacharacters_literally() {
    let (_dir, path) = temp_file("input.txt", "a.b\naXb\n");
    ungrep_cmd()
        .args(["-F", "a.b", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout("a.b\n");
}

#[test]
fn combining_two_dialect_flags_is_a_usage_error() {
    let (_dir, path) = temp_file("input.txt", "x\n");
    ungrep_cmd()
        .args(["-E", "-F", "x", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(2);
}
