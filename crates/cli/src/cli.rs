// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line argument parsing (§6, supplemented by SPEC_FULL §D): a
//! single flat `clap::Parser` struct, no subcommands — this tool has one
//! mode of operation. Resolution of these flags into the driver's own
//! types ([`crate::driver::DriverOptions`], [`crate::pattern::Dialect`],
//! [`crate::driver::SearchMode`]) happens in `main.rs`, the same division
//! of labor the teacher keeps between its `cli.rs` (shape) and `main.rs`
//! (what the shape means).

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::printer::BinaryPolicy;

/// Search for PATTERN in each FILE.
///
/// With no FILE, or when FILE is `-`, reads standard input. When neither
/// `-e` nor `-f` is given, the first positional argument is the pattern
/// and the rest are files; otherwise every positional argument is a file.
#[derive(Parser, Debug)]
#[command(name = "ungrep")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("dialect").args(["extended_regexp", "fixed_strings", "basic_regexp", "perl_regexp"])))]
pub struct Cli {
    /// Select extended regular expressions (`-E`)
    #[arg(short = 'E', long = "extended-regexp")]
    pub extended_regexp: bool,

    /// Select fixed strings, no metacharacters (`-F`)
    #[arg(short = 'F', long = "fixed-strings")]
    pub fixed_strings: bool,

    /// Select basic regular expressions (`-G`, the default)
    #[arg(short = 'G', long = "basic-regexp")]
    pub basic_regexp: bool,

    /// Select Perl-compatible regular expressions (`-P`)
    #[arg(short = 'P', long = "perl-regexp")]
    pub perl_regexp: bool,

    /// Use PAT as a pattern (repeatable)
    #[arg(short = 'e', long = "regexp", value_name = "PAT")]
    pub regexp: Vec<String>,

    /// Read patterns from FILE, one per line (repeatable; `-` = stdin)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub pattern_file: Vec<PathBuf>,

    /// Ignore case distinctions
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Match only whole words (disabled under `-p`)
    #[arg(short = 'w', long = "word-regexp")]
    pub word_regexp: bool,

    /// Match only whole lines
    #[arg(short = 'x', long = "line-regexp")]
    pub line_regexp: bool,

    /// Invert match sense: select non-matching lines
    #[arg(short = 'v', long = "invert-match")]
    pub invert_match: bool,

    /// Print only a count of matching lines per file
    #[arg(short = 'c', long = "count")]
    pub count: bool,

    /// Print only names of files containing a match
    #[arg(short = 'l', long = "files-with-matches")]
    pub files_with_matches: bool,

    /// Print only names of files with no match
    #[arg(short = 'L', long = "files-without-match")]
    pub files_without_match: bool,

    /// Stop reading a file after NUM matching lines
    #[arg(short = 'm', long = "max-count", value_name = "NUM")]
    pub max_count: Option<usize>,

    /// Prefix each line of output with its line number
    #[arg(short = 'n', long = "line-number")]
    pub line_number: bool,

    /// Prefix each line of output with its byte offset
    #[arg(short = 'b', long = "byte-offset")]
    pub byte_offset: bool,

    /// Always print the filename for each match
    #[arg(short = 'H', long = "with-filename")]
    pub with_filename: bool,

    /// Never print the filename for each match
    #[arg(short = 'h', long = "no-filename")]
    pub no_filename: bool,

    /// Print NUM lines of trailing context (disabled under `-p`)
    #[arg(short = 'A', long = "after-context", value_name = "NUM")]
    pub after_context: Option<usize>,

    /// Print NUM lines of leading context (disabled under `-p`)
    #[arg(short = 'B', long = "before-context", value_name = "NUM")]
    pub before_context: Option<usize>,

    /// Print NUM lines of both leading and trailing context (disabled under `-p`)
    #[arg(short = 'C', long = "context", value_name = "NUM")]
    pub context: Option<usize>,

    /// Print only the matched part of each line
    #[arg(short = 'o', long = "only-matching")]
    pub only_matching: bool,

    /// Quiet; exit immediately with status 0 on the first match
    #[arg(short = 'q', long = "quiet", alias = "silent")]
    pub quiet: bool,

    /// Recurse into directories
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Recurse into directories, following all symlinks
    #[arg(short = 'R', long = "dereference-recursive")]
    pub dereference_recursive: bool,

    /// Run the recursive search across NUM parallel workers (implies `-r`)
    #[arg(short = 'p', long = "jobs", value_name = "NUM")]
    pub jobs: Option<usize>,

    /// Lines are terminated by a NUL byte instead of newline
    #[arg(short = 'z', long = "null-data")]
    pub null_data: bool,

    /// How to handle a file that looks binary
    #[arg(long = "binary-files", value_name = "TYPE", default_value = "binary")]
    pub binary_files: BinaryFilesArg,

    /// Colorize matching output; WHEN is `always`, `never`, or `auto`
    #[arg(long = "color", visible_alias = "colour", value_name = "WHEN", num_args = 0..=1, default_missing_value = "always")]
    pub color: Option<ColorWhen>,

    /// Never colorize output, overriding `--color`
    #[arg(long = "no-color", visible_alias = "no-colour")]
    pub no_color: bool,

    /// Suppress error messages about nonexistent or unreadable files
    #[arg(short = 's', long = "no-messages")]
    pub no_messages: bool,

    /// Pattern (when neither `-e` nor `-f` is given) followed by files to search
    #[arg(value_name = "PATTERN_OR_FILE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub positional: Vec<String>,
}

/// `--binary-files=TYPE` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BinaryFilesArg {
    Binary,
    Text,
    #[value(name = "without-match")]
    WithoutMatch,
}

impl From<BinaryFilesArg> for BinaryPolicy {
    fn from(arg: BinaryFilesArg) -> Self {
        match arg {
            BinaryFilesArg::Binary => BinaryPolicy::Binary,
            BinaryFilesArg::Text => BinaryPolicy::Text,
            BinaryFilesArg::WithoutMatch => BinaryPolicy::WithoutMatch,
        }
    }
}

/// `--color[=WHEN]` (§6 ambient CLI ergonomics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorWhen {
    Always,
    Never,
    Auto,
}

impl Cli {
    /// Resolve `-E -F -G -P` to one [`crate::pattern::Dialect`]. The
    /// `dialect` `ArgGroup` above already rejects combining more than one
    /// of these flags, so at most one of the four bools is ever set here.
    pub fn dialect(&self) -> crate::pattern::Dialect {
        use crate::pattern::Dialect;
        if self.perl_regexp {
            Dialect::Perl
        } else if self.fixed_strings {
            Dialect::Fixed
        } else if self.extended_regexp {
            Dialect::Extended
        } else {
            Dialect::Basic
        }
    }

    /// Split the trailing positional arguments into an inline pattern (at
    /// most one, only when `-e`/`-f` were not given) and a file list.
    pub fn pattern_and_files(&self) -> (Option<String>, Vec<PathBuf>) {
        if !self.regexp.is_empty() || !self.pattern_file.is_empty() {
            return (None, self.positional.iter().map(PathBuf::from).collect());
        }
        let mut it = self.positional.iter();
        let pattern = it.next().cloned();
        (pattern, it.map(PathBuf::from).collect())
    }

    /// `(force_color, no_color)` inputs for [`crate::color::resolve_color`].
    pub fn color_inputs(&self) -> (bool, bool) {
        match self.color {
            Some(ColorWhen::Always) => (true, false),
            Some(ColorWhen::Never) => (false, true),
            Some(ColorWhen::Auto) => (false, self.no_color),
            None => (false, self.no_color),
        }
    }

    /// `-C N` sets both sides unless `-A`/`-B` narrows just one of them.
    pub fn effective_context(&self) -> (usize, usize) {
        let before = self.before_context.or(self.context).unwrap_or(0);
        let after = self.after_context.or(self.context).unwrap_or(0);
        (before, after)
    }

    /// `-z`: the end-of-line byte is NUL instead of newline.
    pub fn eol(&self) -> u8 {
        if self.null_data {
            0
        } else {
            b'\n'
        }
    }

    /// Whether `-r`/`-R`/`-p` implies a recursive search at all.
    pub fn wants_recursion(&self) -> bool {
        self.recursive || self.dereference_recursive || self.jobs.is_some()
    }

    /// `-R` (or `-r` is plain, non-dereferencing recursion).
    pub fn follow_symlinks(&self) -> bool {
        self.dereference_recursive
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
