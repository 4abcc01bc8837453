// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::sync::Mutex;

use tempfile::tempdir;

use super::*;

/// A processor that "prints" each regular file's name followed by a
/// newline, counting as matched — enough to exercise ordering without
/// depending on the match engine.
struct NameEchoProcessor;

impl EntryProcessor for NameEchoProcessor {
    fn process(&mut self, entry: &ignore::DirEntry) -> ProcessedEntry {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            return ProcessedEntry {
                bytes: Vec::new(),
                matched: false,
                ok: true,
            };
        }
        let mut bytes = entry.file_name().to_string_lossy().into_owned().into_bytes();
        bytes.push(b'\n');
        ProcessedEntry {
            bytes,
            matched: true,
            ok: true,
        }
    }
}

fn make_tree(n: usize) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for i in 0..n {
        fs::write(dir.path().join(format!("file-{i:03}.txt")), b"x").unwrap();
    }
    dir
}

#[test]
fn parallel_output_matches_sequential_baseline_regardless_of_worker_count() {
    let dir = make_tree(37);
    let config = WalkerConfig::default();

    let sequential: Vec<u8> = {
        let mut out = Vec::new();
        let (rx, handle) = crate::walk::walk_sequential(dir.path(), config.clone());
        let mut names: Vec<_> = rx.iter().filter(|e| !e.is_dir).map(|e| e.path).collect();
        names.sort();
        handle.join();
        for path in &names {
            out.extend_from_slice(path.file_name().unwrap().to_string_lossy().as_bytes());
            out.push(b'\n');
        }
        out
    };

    for worker_count in [1usize, 2, 4, 8] {
        let collected = Mutex::new(Vec::new());
        let outcome = run_parallel(
            dir.path(),
            &config,
            worker_count,
            16,
            |_worker_id| NameEchoProcessor,
            |bytes| collected.lock().unwrap().extend_from_slice(bytes),
        );

        assert!(outcome.all_ok);
        assert_eq!(outcome.entries_visited >= 37, true);

        let mut got: Vec<u8> = collected.into_inner().unwrap();
        let mut got_lines: Vec<&[u8]> = got.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        let mut want_lines: Vec<&[u8]> = sequential.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        got_lines.sort();
        want_lines.sort();
        assert_eq!(got_lines, want_lines, "worker_count={worker_count}");
        got.clear();
    }
}

#[test]
fn parallel_traversal_preserves_deterministic_order_within_a_single_worker() {
    let dir = make_tree(5);
    let config = WalkerConfig::default();

    let collected = Mutex::new(Vec::new());
    run_parallel(
        dir.path(),
        &config,
        1,
        64,
        |_worker_id| NameEchoProcessor,
        |bytes| collected.lock().unwrap().extend_from_slice(bytes),
    );

    let got = collected.into_inner().unwrap();
    let text = String::from_utf8(got).unwrap();
    let mut lines: Vec<&str> = text.lines().collect();
    let mut sorted = lines.clone();
    sorted.sort();
    lines.sort();
    assert_eq!(lines, sorted);
}

#[test]
fn parallel_traversal_respects_low_ceiling_with_multiple_rounds() {
    let dir = make_tree(20);
    let config = WalkerConfig::default();

    let collected = Mutex::new(Vec::new());
    let outcome = run_parallel(
        dir.path(),
        &config,
        3,
        2,
        |_worker_id| NameEchoProcessor,
        |bytes| collected.lock().unwrap().extend_from_slice(bytes),
    );

    let got = collected.into_inner().unwrap();
    let count = got.iter().filter(|&&b| b == b'\n').count();
    assert_eq!(count, 20);
    assert!(outcome.any_matched);
}

struct FailingProcessor {
    fail_on: std::ffi::OsString,
}

impl EntryProcessor for FailingProcessor {
    fn process(&mut self, entry: &ignore::DirEntry) -> ProcessedEntry {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            return ProcessedEntry {
                bytes: Vec::new(),
                matched: false,
                ok: true,
            };
        }
        let ok = entry.file_name() != self.fail_on;
        ProcessedEntry {
            bytes: Vec::new(),
            matched: false,
            ok,
        }
    }
}

#[test]
fn one_worker_failure_does_not_halt_the_others_but_fails_the_aggregate() {
    let dir = make_tree(10);
    fs::write(dir.path().join("poison.txt"), b"x").unwrap();
    let config = WalkerConfig::default();

    let outcome = run_parallel(
        dir.path(),
        &config,
        4,
        64,
        |_worker_id| FailingProcessor {
            fail_on: std::ffi::OsString::from("poison.txt"),
        },
        |_bytes| {},
    );

    assert!(!outcome.all_ok);
    // 11 regular files plus the root directory entry itself.
    assert_eq!(outcome.entries_visited, 12);
}
