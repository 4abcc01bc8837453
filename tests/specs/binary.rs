//! Binary-file handling (`--binary-files`, §6).

use super::prelude::*;

fn binary_file() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    let mut contents = b"needle\0binary\0goop".to_vec();
    contents.push(0);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn default_binary_policy_prints_a_notice_instead_of_raw_bytes() {
    let (_dir, path) = binary_file();
    let output = ungrep_cmd().args(["needle", path.to_str().unwrap()]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("binary file"));
    assert!(stdout.contains("matches"));
    assert!(!stdout.contains('\0'));
}

#[test]
fn binary_files_text_prints_matches_as_if_it_were_text() {
    let (_dir, path) = binary_file();
    ungrep_cmd()
        .args(["--binary-files=text", "needle", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicates::str::contains("needle"));
}

#[test]
fn binary_files_without_match_treats_it_as_no_match_at_all() {
    let (_dir, path) = binary_file();
    ungrep_cmd()
        .args(["--binary-files=without-match", "needle", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout("");
}
