// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Line Printer (§4.D): head/middle/tail emission for one matched (or,
//! under `-v`, non-matched) line, plus the "binary file matches" notice
//! and encoding-error suppression policy.
//!
//! Grounded on the teacher's `color.rs::ColorScheme` (which this module
//! consumes rather than reimplements) and its habit of writing straight to
//! a `termcolor::WriteColor` rather than building a formatted string
//! first.

use std::io::Write;
use std::path::Path;

use termcolor::WriteColor;

use crate::color::ColorScheme;
use crate::engine::{LineMatch, MatchEngine};
use crate::error::Error;

/// What the head phase prints before each line (§4.D phase 1); computed
/// once per search, not per line.
#[derive(Debug, Clone, Copy)]
pub struct HeadFields {
    pub with_filename: bool,
    pub line_numbers: bool,
    pub byte_offsets: bool,
}

/// Binary-file handling policy (§6 `--binary-files`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryPolicy {
    Binary,
    Text,
    WithoutMatch,
}

/// Per-file printer state: running line/byte counters and the sticky
/// encoding-error flag (§4.D Encoding-error policy).
pub struct Printer<'a, W> {
    out: &'a mut W,
    scheme: &'a ColorScheme,
    head: HeadFields,
    colorize: bool,
    only_matching: bool,
    sep: u8,
    newlines_seen: u64,
    counted_through: usize,
    encoding_error: bool,
    binary_notice_due: bool,
}

impl<'a, W: Write + WriteColor> Printer<'a, W> {
    pub fn new(out: &'a mut W, scheme: &'a ColorScheme, head: HeadFields, colorize: bool, only_matching: bool, eol: u8) -> Self {
        Self {
            out,
            scheme,
            head,
            colorize,
            only_matching,
            sep: if eol == 0 { 0 } else { b':' },
            newlines_seen: 0,
            counted_through: 0,
            encoding_error: false,
            binary_notice_due: false,
        }
    }

    /// Whether this file's output is currently suppressed by a prior
    /// encoding error (§4.D Encoding-error policy).
    pub fn is_suppressed(&self) -> bool {
        self.encoding_error
    }

    pub fn mark_encoding_error(&mut self) {
        self.encoding_error = true;
    }

    pub fn mark_binary_match(&mut self) {
        self.binary_notice_due = true;
    }

    /// Print one selected line (§4.D phases 1-3). `haystack` is the buffer
    /// window; `m` identifies the line and, when colorizing or `-o`, the
    /// match span within it. `separator` is `:` for a matching line, `-`
    /// for context (context output is sequential-only, per §1).
    pub fn print_line(
        &mut self,
        filename: Option<&Path>,
        haystack: &[u8],
        m: &LineMatch,
        separator: u8,
        engine: Option<&MatchEngine<'_>>,
    ) -> Result<(), Error> {
        if self.encoding_error {
            return Ok(());
        }

        self.print_head(filename, haystack, m, separator)?;

        let eol = if self.sep == 0 { 0u8 } else { b'\n' };
        if self.only_matching {
            self.print_only_matching(haystack, m, engine)?;
        } else {
            self.print_middle_and_tail(haystack, m, engine, eol)?;
        }
        Ok(())
    }

    fn print_head(&mut self, filename: Option<&Path>, haystack: &[u8], m: &LineMatch, separator: u8) -> Result<(), Error> {
        if self.head.with_filename {
            if let Some(path) = filename {
                self.with_color(&self.scheme.filename.clone(), |out| {
                    write!(out, "{}", path.display()).map_err(write_err)
                })?;
                self.write_separator(separator)?;
            }
        }
        if self.head.line_numbers {
            self.newlines_seen += count_newlines(&haystack[self.counted_through..m.line_start], self.newline_byte()) as u64;
            self.counted_through = m.line_start;
            self.with_color(&self.scheme.line_number.clone(), |out| {
                write!(out, "{}", self.newlines_seen + 1).map_err(write_err)
            })?;
            self.write_separator(separator)?;
        }
        if self.head.byte_offsets {
            self.with_color(&self.scheme.line_number.clone(), |out| {
                write!(out, "{}", m.line_start).map_err(write_err)
            })?;
            self.write_separator(separator)?;
        }
        Ok(())
    }

    fn newline_byte(&self) -> u8 {
        if self.sep == 0 {
            0
        } else {
            b'\n'
        }
    }

    fn write_separator(&mut self, separator: u8) -> Result<(), Error> {
        self.with_color(&self.scheme.separator.clone(), |out| out.write_all(&[separator]).map_err(write_err))
    }

    /// `-o`: print only each matching sub-span, one per output line
    /// (§4.D phase 2, specialized for only-matching mode). An empty match
    /// still emits (as an empty line) and advances by at least one byte,
    /// mirroring the cascade's own empty-match progress guarantee.
    fn print_only_matching(&mut self, haystack: &[u8], m: &LineMatch, engine: Option<&MatchEngine<'_>>) -> Result<(), Error> {
        let mut current = Some((m.match_start, m.match_end));
        while let Some((ms, me)) = current {
            self.emit_colored_match(haystack, ms, me)?;
            self.out.write_all(b"\n").map_err(write_err)?;

            let advance_from = if me > ms { me } else { (me + 1).min(m.line_end) };
            current = match engine {
                Some(engine) if advance_from < m.line_end => {
                    engine.find(haystack, advance_from, m.line_end, None).and_then(|next| {
                        if next.line_start == m.line_start {
                            Some((next.match_start, next.match_end))
                        } else {
                            None
                        }
                    })
                }
                _ => None,
            };
        }
        Ok(())
    }

    fn print_middle_and_tail(&mut self, haystack: &[u8], m: &LineMatch, engine: Option<&MatchEngine<'_>>, eol: u8) -> Result<(), Error> {
        if self.colorize {
            let mut cursor = m.line_start;
            if let Some(engine) = engine {
                let mut next_match = Some((m.match_start, m.match_end));
                while let Some((ms, me)) = next_match {
                    self.out.write_all(&haystack[cursor..ms]).map_err(write_err)?;
                    self.emit_colored_match(haystack, ms, me)?;
                    cursor = if me > ms { me } else { (me + 1).min(m.line_end) };
                    if cursor >= m.line_end {
                        break;
                    }
                    next_match = engine.find(haystack, cursor, m.line_end, None).and_then(|next| {
                        if next.line_start == m.line_start {
                            Some((next.match_start, next.match_end))
                        } else {
                            None
                        }
                    });
                }
                self.out.write_all(&haystack[cursor..m.line_end]).map_err(write_err)?;
            } else {
                self.out.write_all(&haystack[m.line_start..m.line_end]).map_err(write_err)?;
            }
        } else {
            self.out.write_all(&haystack[m.line_start..m.line_end]).map_err(write_err)?;
        }
        if eol != 0 {
            self.out.write_all(&[b'\n']).map_err(write_err)?;
        }
        Ok(())
    }

    fn emit_colored_match(&mut self, haystack: &[u8], start: usize, end: usize) -> Result<(), Error> {
        self.with_color(&self.scheme.matched.clone(), |out| out.write_all(&haystack[start..end]).map_err(write_err))
    }

    fn with_color(
        &mut self,
        spec: &termcolor::ColorSpec,
        body: impl FnOnce(&mut W) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if self.colorize {
            self.out.set_color(spec).map_err(write_err)?;
            body(self.out)?;
            self.out.reset().map_err(write_err)?;
        } else {
            body(self.out)?;
        }
        Ok(())
    }

    /// The bare `--` line GNU grep prints between non-adjacent context
    /// blocks (§4.D phase grouping). Carries no head fields of its own.
    pub fn print_group_separator(&mut self) -> Result<(), Error> {
        if self.encoding_error {
            return Ok(());
        }
        self.out.write_all(b"--\n").map_err(write_err)
    }

    /// Synthetic notice emitted at end-of-file when binary-file mode is
    /// `binary` and at least one match occurred (§4.D).
    pub fn print_binary_notice(&mut self, filename: &Path) -> Result<(), Error> {
        if self.binary_notice_due {
            writeln!(self.out, "binary file {} matches", filename.display()).map_err(write_err)?;
        }
        Ok(())
    }
}

fn count_newlines(slice: &[u8], eol: u8) -> usize {
    slice.iter().filter(|&&b| b == eol).count()
}

fn write_err(e: std::io::Error) -> Error {
    Error::WriteFailure(e)
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
