//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::process::Command;

pub use predicates;
pub use predicates::prelude::PredicateBooleanExt;

/// A `Command` configured to run the `ungrep` binary.
pub fn ungrep_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ungrep"))
}

/// A temp directory with one file named `name` holding `contents`.
pub fn temp_file(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), name, contents);
    (dir, path)
}

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
