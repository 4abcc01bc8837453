// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

/// ungrep error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pattern failed to compile under the selected dialect (§4.A).
    ///
    /// `file`/`line` identify which source (a `-f FILE` or `-e` argument)
    /// the offending pattern came from, resolved via the compiler's
    /// blob-to-source side mapping. `message` is pre-formatted with that
    /// `file:line:` prefix by the caller, since the prefix is optional
    /// (absent for an inline `-e` pattern with no line mapping).
    #[error("{message}")]
    PatternSyntax {
        pattern: String,
        file: Option<String>,
        line: Option<usize>,
        message: String,
    },

    /// Invalid command-line arguments, or a combination forbidden by policy
    /// (e.g. `-p` together with a parallel-incompatible option).
    #[error("{0}")]
    Argument(String),

    /// File I/O error (open, read, seek, close).
    #[error("{path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line contained a sequence invalid in the current encoding.
    #[error("{}: binary file encoding error", .path.display())]
    Encoding { path: PathBuf },

    /// Write to standard output failed; captured so `main` can suppress
    /// further close-on-exit diagnostics and force exit status 2.
    #[error("write error: {0}")]
    WriteFailure(#[source] std::io::Error),

    /// Memory exhaustion; fatal everywhere it occurs.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Internal invariant violation (a bug, not a user error).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Build the `file:line: ` prefix a [`Error::PatternSyntax`] message uses,
/// when the compiler's blob-to-source mapping resolved one.
pub fn pattern_loc_prefix(file: Option<&str>, line: Option<usize>) -> String {
    match (file, line) {
        (Some(f), Some(l)) => format!("{f}:{l}: "),
        (Some(f), None) => format!("{f}: "),
        _ => String::new(),
    }
}

/// Result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes per §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// At least one match was emitted.
    Matched = 0,
    /// The search completed with no match.
    NoMatch = 1,
    /// An error occurred (pattern syntax, I/O, write failure, ...).
    Error = 2,
}

impl From<&Error> for ExitCode {
    fn from(_err: &Error) -> Self {
        ExitCode::Error
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
