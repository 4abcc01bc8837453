// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive traversal (§4.E, §2 component E): a sequential path for `-r`
//! without parallelism, and the shared walker configuration the parallel
//! path (`walk::parallel`) replicates per worker.
//!
//! Grounded on the teacher's `walker.rs`, which wraps the `ignore` crate's
//! `WalkBuilder` and streams discovered entries through a background
//! thread and a `crossbeam_channel`; that streaming shape is kept for the
//! sequential path here. The teacher's own `build_parallel`/`WalkState`
//! work-stealing path is dropped entirely — §4.E mandates `visit_index mod
//! N` static assignment across independently-owned iterators, which
//! `walk::parallel` implements instead (see its module doc).

pub mod parallel;
pub mod slots;

use std::path::{Path, PathBuf};

use crossbeam_channel::{bounded, Receiver};
use ignore::{DirEntry, WalkBuilder};

/// Directories never descended into, regardless of ignore rules — mirrors
/// the teacher's hard-coded skip list for noisy, rarely-searched trees.
pub(crate) const SKIP_DIRECTORIES: &[&str] = &["node_modules", ".git"];

/// Traversal configuration shared by the sequential and parallel paths.
/// Every worker in parallel mode builds its own `ignore::Walk` from an
/// identical `WalkerConfig`, which is what keeps independently-owned
/// iterators walking the same deterministic entry sequence (§4.E: "all
/// workers observe and skip the same set of excluded or errored entries").
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub max_depth: Option<usize>,
    pub hidden: bool,
    pub git_ignore: bool,
    /// `-R`: follow symlinks (the `ignore` crate detects and reports loops
    /// rather than hanging). `-r` alone does not follow them.
    pub follow_links: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            hidden: true,
            git_ignore: true,
            follow_links: false,
        }
    }
}

/// One discovered filesystem entry, trimmed to what the driver and match
/// engine need — the walker itself does not stat beyond what `ignore`
/// already collects while filtering.
#[derive(Debug)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub depth: usize,
    pub is_dir: bool,
}

/// Build the `ignore::Walk` one sequential pass, or one parallel worker's
/// private replica, walks. Identical config in, identical deterministic
/// order out.
pub(crate) fn build_walk(root: &Path, config: &WalkerConfig) -> ignore::Walk {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(config.hidden)
        .git_ignore(config.git_ignore)
        .git_exclude(true)
        .git_global(true)
        .follow_links(config.follow_links);
    if let Some(depth) = config.max_depth {
        builder.max_depth(Some(depth));
    }
    builder.filter_entry(|entry| !is_skip_dir(entry));
    builder.build()
}

fn is_skip_dir(entry: &DirEntry) -> bool {
    entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIP_DIRECTORIES.contains(&name))
            .unwrap_or(false)
}

/// Recognize a symlink-loop error anywhere in an `ignore::Error`'s wrapper
/// chain (it nests the underlying cause under path/depth/line context).
pub(crate) fn is_loop_error(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. } => is_loop_error(err),
        ignore::Error::WithDepth { err, .. } => is_loop_error(err),
        ignore::Error::WithLineNumber { err, .. } => is_loop_error(err),
        _ => false,
    }
}

/// Handle to a background sequential walk; join to retrieve final stats.
pub struct WalkHandle {
    handle: std::thread::JoinHandle<WalkStats>,
}

impl WalkHandle {
    pub fn join(self) -> WalkStats {
        self.handle.join().unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WalkStats {
    pub files_found: usize,
    pub errors: usize,
    pub symlink_loops: usize,
}

/// Walk `root` sequentially in a background thread, streaming entries
/// through a bounded channel (§4.F driver: the non-parallel traversal
/// path). Used when recursion is requested but parallelism is not (either
/// not requested, or demoted per the policy in `driver.rs`).
pub fn walk_sequential(root: &Path, config: WalkerConfig) -> (Receiver<WalkEntry>, WalkHandle) {
    let (tx, rx) = bounded(1024);
    let root = root.to_path_buf();

    let handle = std::thread::spawn(move || {
        let walker = build_walk(&root, &config);
        let mut stats = WalkStats::default();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                    stats.files_found += usize::from(!is_dir);
                    let walked = WalkEntry {
                        depth: entry.depth(),
                        is_dir,
                        path: entry.into_path(),
                    };
                    if tx.send(walked).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    if is_loop_error(&err) {
                        tracing::warn!("symlink loop detected: {err}");
                        stats.symlink_loops += 1;
                    } else {
                        tracing::warn!("walk error: {err}");
                        stats.errors += 1;
                    }
                }
            }
        }

        stats
    });

    (rx, WalkHandle { handle })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
