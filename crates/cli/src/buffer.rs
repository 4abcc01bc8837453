// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Streaming Buffer Manager (§4.C): a page-aligned, slack-padded ring
//! that ingests a byte stream without any line-length assumption, carries
//! a partial trailing line across refills, and keeps the sentinel/padding
//! invariants the match engine's backward/forward line scans rely on.
//!
//! Grounded on the teacher's `reader.rs` (size-gated single-shot read) and
//! `file_size.rs` (size classing), generalized from "read the whole file
//! once, reject it if too large" into a genuine incremental ring buffer —
//! neither teacher file survives this generalization as a separate module,
//! so their size-threshold constants are gone; streaming has no file-size
//! ceiling.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Writable padding `fill` always leaves after `end`, sized for
/// word-aligned scanners (§4.C invariant ii).
const WORD_PAD: usize = std::mem::size_of::<usize>();

/// The unit `fill` grows and reads by. There is no portable, safe way to
/// query the platform's true page size without an FFI call, which the
/// workspace's `unsafe_code = "deny"` lint forbids; a fixed 4 KiB is the
/// common case on every target this crate ships for.
const PAGE_SIZE: usize = 4096;

const INITIAL_CAPACITY: usize = PAGE_SIZE * 4;

/// Why a file was declared binary (§4.C NUL handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryReason {
    /// A NUL byte was observed and zapped.
    NulByte,
}

/// A page-aligned ring buffer over a single descriptor, implementing the
/// fill algorithm and sentinel/padding invariants of §4.C.
///
/// `window()` always starts at the buffer's artificial leading sentinel
/// (an end-of-line byte at index 0, standing in for "the byte immediately
/// before `begin`" when `begin` is still at the very first line); once the
/// caller advances `begin` past real data, that invariant is upheld for
/// free, since every line in the stream itself ends in an eol byte.
pub struct BufferManager<R> {
    reader: R,
    origin: PathBuf,
    buf: Vec<u8>,
    begin: usize,
    end: usize,
    eol: u8,
    skip_nuls: bool,
    size_hint: Option<u64>,
    reader_eof: bool,
    binary: Option<BinaryReason>,
    /// Sticky per spec's "on failure, set a sticky flag to disable
    /// hole-skipping for the rest of the file" — here permanently set,
    /// since querying the descriptor for its next data region needs a
    /// `lseek(SEEK_DATA)` this crate cannot issue without `unsafe` FFI.
    /// The plain all-zero-block skip below still handles the common case
    /// of a sparse file whose holes simply read back as zeros.
    hole_query_disabled: bool,
    bytes_skipped_in_holes: u64,
}

impl<R: Read> BufferManager<R> {
    /// `size_hint` is the file's reported size, when trustworthy (regular
    /// file, shared memory, or typed memory object per §4.C) — used only
    /// to cap the buffer's doubling growth, never to gate whether a file
    /// is read at all.
    pub fn new(reader: R, origin: PathBuf, eol: u8, skip_nuls: bool, size_hint: Option<u64>) -> Self {
        let mut buf = vec![0u8; INITIAL_CAPACITY];
        buf[0] = eol;
        Self {
            reader,
            origin,
            buf,
            begin: 1,
            end: 1,
            eol,
            skip_nuls,
            size_hint,
            reader_eof: false,
            binary: None,
            hole_query_disabled: true,
            bytes_skipped_in_holes: 0,
        }
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// The current window: everything from the buffer's start (including
    /// the leading sentinel) through the write frontier.
    pub fn window(&self) -> &[u8] {
        &self.buf[..self.end]
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Advance `begin` past data the caller has fully consumed (printed or
    /// determined not to match). Anything before the new `begin` may be
    /// overwritten on the next `fill`.
    pub fn consume_to(&mut self, new_begin: usize) {
        debug_assert!(new_begin >= self.begin && new_begin <= self.end);
        self.begin = new_begin;
    }

    pub fn is_binary(&self) -> Option<BinaryReason> {
        self.binary
    }

    /// Whether the underlying reader has reached true end-of-file. A
    /// residual, eol-less line at the tail of `window()` is only final
    /// once this is `true`; otherwise the next `fill()` may still extend
    /// it with more bytes from the stream.
    pub fn is_eof(&self) -> bool {
        self.reader_eof
    }

    pub fn bytes_skipped_in_holes(&self) -> u64 {
        self.bytes_skipped_in_holes
    }

    /// Run the fill algorithm (§4.C). Returns `true` if `window()` has any
    /// unconsumed bytes left to scan (including a final, eol-less residual
    /// line at true end-of-file), `false` once the stream and all residue
    /// are exhausted.
    pub fn fill(&mut self) -> Result<bool, Error> {
        if self.reader_eof && self.begin >= self.end {
            return Ok(false);
        }

        if !self.reader_eof {
            self.ensure_capacity_for_refill();
            self.read_one_block()?;
            self.zap_nuls();
        }

        Ok(self.end > self.begin)
    }

    fn save_len(&self) -> usize {
        self.end - self.begin
    }

    /// Grow (doubling, page-aligned) or reuse in place depending on
    /// available slack between the write frontier and the tail padding.
    fn ensure_capacity_for_refill(&mut self) {
        let save = self.save_len();
        let needed = save + PAGE_SIZE;
        let slack = self.buf.len().saturating_sub(WORD_PAD).saturating_sub(self.end);
        if slack >= PAGE_SIZE {
            return;
        }

        let mut new_cap = self.buf.len().max(PAGE_SIZE);
        while new_cap < needed + WORD_PAD {
            new_cap *= 2;
        }
        if let Some(hint) = self.size_hint {
            let hinted = (hint as usize).saturating_add(PAGE_SIZE).saturating_add(WORD_PAD);
            if hinted > needed + WORD_PAD {
                new_cap = new_cap.min(hinted.next_power_of_two());
            }
        }

        let mut new_buf = vec![0u8; new_cap];
        new_buf[0] = self.eol;
        new_buf[1..1 + save].copy_from_slice(&self.buf[self.begin..self.end]);
        self.buf = new_buf;
        self.begin = 1;
        self.end = 1 + save;
    }

    /// Read one block of new data, skipping over all-zero blocks when
    /// `skip_nuls` is set (the portable half of hole-skipping: a sparse
    /// region reads back as zeros even without a `SEEK_HOLE` query).
    fn read_one_block(&mut self) -> Result<(), Error> {
        loop {
            let write_start = self.end;
            let write_end = self.buf.len() - WORD_PAD;
            if write_start >= write_end {
                return Ok(());
            }
            // Read one page at a time (rather than filling all available
            // slack in a single call) so an all-zero block — the readable
            // signature of a sparse-file hole — is checked and skipped on
            // its own, instead of being diluted by whatever real data
            // happens to land in the same read.
            let want = write_start + PAGE_SIZE.min(write_end - write_start);
            let n = self
                .reader
                .read(&mut self.buf[write_start..want])
                .map_err(|e| Error::Io {
                    path: self.origin.clone(),
                    source: e,
                })?;
            if n == 0 {
                self.reader_eof = true;
                return Ok(());
            }
            self.end = write_start + n;

            if self.skip_nuls && self.buf[write_start..self.end].iter().all(|&b| b == 0) {
                self.bytes_skipped_in_holes += n as u64;
                self.end = write_start;
                continue;
            }
            return Ok(());
        }
    }

    /// Overwrite every remaining NUL byte in the window with `eol` (§4.C
    /// NUL handling), marking the file binary on the first one seen.
    fn zap_nuls(&mut self) {
        for b in &mut self.buf[self.begin..self.end] {
            if *b == 0 {
                if self.binary.is_none() {
                    self.binary = Some(BinaryReason::NulByte);
                }
                *b = self.eol;
            }
        }
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
