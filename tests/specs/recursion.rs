//! Recursive traversal (§4.E) and its parallel/sequential equivalence.

use super::prelude::*;

fn make_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "top.txt", "needle at top\nno match\n");
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    write(dir.path().join("sub").as_path(), "deep.txt", "needle deep\nother\n");
    write(dir.path().join("sub").as_path(), "empty.txt", "nothing here\n");
    dir
}

#[test]
fn a_bare_directory_target_is_rejected_without_recursion() {
    let dir = tempfile::tempdir().unwrap();
    ungrep_cmd()
        .args(["needle", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicates::str::contains("Is a directory"));
}

#[test]
fn recursive_flag_finds_matches_in_nested_files() {
    let dir = make_tree();
    let output = ungrep_cmd()
        .args(["-r", "needle", dir.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("needle at top"));
    assert!(stdout.contains("needle deep"));
}

#[test]
fn a_directory_error_does_not_abort_the_rest_of_the_targets() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("subdir");
    std::fs::create_dir_all(&bad).unwrap();
    let good = write(dir.path(), "good.txt", "needle\n");

    let output = ungrep_cmd()
        .args(["needle", bad.to_str().unwrap(), good.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("needle"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Is a directory"));
}

/// §4.E's whole point is that sharding the walk across workers is
/// invisible from the outside: the Output Slot array flushes strictly in
/// visit order, over the same deterministic `ignore::Walk` the sequential
/// path uses, so the two byte streams must match exactly — not just the
/// same lines in some order.
#[test]
fn parallel_recursive_search_matches_sequential_output_byte_for_byte() {
    let dir = make_tree();

    let sequential = ungrep_cmd()
        .args(["-r", "-n", "needle", dir.path().to_str().unwrap()])
        .output()
        .unwrap();
    let parallel = ungrep_cmd()
        .args(["-r", "-p", "4", "-n", "needle", dir.path().to_str().unwrap()])
        .output()
        .unwrap();

    assert!(sequential.status.success());
    assert!(parallel.status.success());
    assert_eq!(sequential.stdout, parallel.stdout);
}

#[test]
fn explicit_jobs_with_context_is_a_fatal_argument_error() {
    let dir = make_tree();
    ungrep_cmd()
        .args(["-r", "-p", "2", "-C", "1", "needle", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2);
}
