// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The Top-level Driver (§4.F): per-file orchestration over the buffer
//! manager, match engine, and line printer; directory/device policy; the
//! stdin-is-also-stdout self-reference guard; and exit-status aggregation.
//! Also resolves whether a recursive search runs sequentially or in
//! parallel (§9 Open Question, recorded in DESIGN.md).
//!
//! Grounded on the teacher's `main.rs::run_check` orchestration shape (one
//! function walking a list of targets, aggregating an exit status across
//! them) and its habit of routing per-target I/O failures through a shared
//! diagnostic path rather than aborting the whole run.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::buffer::BufferManager;
use crate::color::ColorScheme;
use crate::engine::{LineMatch, MatchEngine};
use crate::error::{Error, ExitCode};
use crate::pattern::PatternSet;
use crate::printer::{BinaryPolicy, HeadFields, Printer};
use crate::walk::{walk_sequential, WalkerConfig};

/// One target named on the command line, or `-` for standard input.
#[derive(Debug, Clone)]
pub enum Target {
    Stdin,
    Path(PathBuf),
}

/// Recursion/parallelism policy, already resolved by [`resolve_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// No recursion: every target must be a regular file (or `-`).
    Flat,
    /// Recurse, walking directories with a single iterator.
    RecurseSequential,
    /// Recurse, sharding the walk across `worker_count` threads (§4.E).
    RecurseParallel { worker_count: usize },
}

/// Whether each output line is prefixed with its filename (§6 `-H -h`):
/// forced on or off, or left to the driver's own multi-file heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameMode {
    /// Print a filename only when more than one target is being searched.
    Auto,
    /// `-H`: always print it, even for a single target.
    Always,
    /// `-h`: never print it, even across several targets.
    Never,
}

/// Everything the driver needs that isn't already baked into a compiled
/// [`PatternSet`]: output formatting choices and the handful of modes that
/// change *which* lines are selected rather than how the engine finds them.
#[derive(Clone)]
pub struct DriverOptions {
    pub eol: u8,
    pub invert: bool,
    pub count_only: bool,
    pub list_matching_files: bool,
    pub list_non_matching_files: bool,
    pub max_matches: Option<usize>,
    pub quiet: bool,
    pub suppress_errors: bool,
    pub filename_mode: FilenameMode,
    pub line_numbers: bool,
    pub byte_offsets: bool,
    pub colorize: bool,
    pub only_matching: bool,
    pub binary_policy: BinaryPolicy,
    pub before_context: usize,
    pub after_context: usize,
    pub mode: SearchMode,
}

impl DriverOptions {
    /// Whether this run needs the uniform per-line scan (§4.D context
    /// grouping, or `-v`'s need to see every non-matching line) rather
    /// than the match engine's cascade-skip fast path.
    fn needs_line_by_line_scan(&self) -> bool {
        self.invert || self.before_context > 0 || self.after_context > 0
    }
}

/// One already-decided, explicit-vs-implicit recursion request plus the
/// unsupported-in-parallel feature set, for [`resolve_mode`].
pub struct ModeRequest {
    pub recurse: bool,
    pub explicit_worker_count: Option<usize>,
    pub implied_worker_count: usize,
    pub has_context: bool,
    pub has_whole_word: bool,
    pub has_include_exclude: bool,
    pub line_buffered: bool,
}

/// §9 Open Question, resolved (recorded in DESIGN.md): an explicit `-p N`
/// combined with a parallel-unsupported feature is a fatal argument error;
/// parallelism implied only by `-r`/`-R` (no explicit `-p`) is silently
/// demoted to sequential instead.
pub fn resolve_mode(req: &ModeRequest) -> Result<SearchMode, Error> {
    if !req.recurse {
        return Ok(SearchMode::Flat);
    }

    let unsupported = req.has_context || req.has_whole_word || req.has_include_exclude || req.line_buffered;

    match req.explicit_worker_count {
        Some(n) => {
            if unsupported {
                Err(Error::Argument(
                    "-p is incompatible with context, whole-word, include/exclude, or line-buffered output".to_string(),
                ))
            } else {
                Ok(SearchMode::RecurseParallel { worker_count: n.max(1) })
            }
        }
        None => {
            if unsupported {
                Ok(SearchMode::RecurseSequential)
            } else {
                Ok(SearchMode::RecurseParallel {
                    worker_count: req.implied_worker_count.max(1),
                })
            }
        }
    }
}

/// Outcome of a full driver run, across every target (§4.F exit status).
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverOutcome {
    pub any_matched: bool,
    pub any_error: bool,
}

impl DriverOutcome {
    /// §4.F: "0 if any match was emitted; 1 if none; 2 if any error was
    /// observed (unless `-q` suppresses it, in which case the first match
    /// forces exit 0)".
    pub fn exit_code(&self, quiet: bool) -> ExitCode {
        if self.any_matched {
            ExitCode::Matched
        } else if self.any_error && !quiet {
            ExitCode::Error
        } else {
            ExitCode::NoMatch
        }
    }
}

struct FileOutcome {
    matched: bool,
}

/// Run the whole search over `targets` per `options`, writing to stdout
/// (colorized according to `scheme`/`color_choice`).
pub fn run(targets: &[Target], patterns: &PatternSet, options: &DriverOptions, scheme: &ColorScheme, color_choice: ColorChoice) -> Result<DriverOutcome, Error> {
    match options.mode {
        SearchMode::Flat | SearchMode::RecurseSequential => run_sequential(targets, patterns, options, scheme, color_choice),
        SearchMode::RecurseParallel { worker_count } => run_parallel_driver(targets, patterns, options, scheme, color_choice, worker_count),
    }
}

fn run_sequential(targets: &[Target], patterns: &PatternSet, options: &DriverOptions, scheme: &ColorScheme, color_choice: ColorChoice) -> Result<DriverOutcome, Error> {
    let mut out = StandardStream::stdout(color_choice);
    let self_ref = stdout_self_reference();

    let mut outcome = DriverOutcome::default();
    let mut expanded: Vec<Target> = Vec::new();
    for target in targets {
        // A directory target rejected under `SearchMode::Flat` (or a loop
        // detected mid-walk) is this *target's* error, not fatal to the
        // whole invocation — the remaining targets still get searched,
        // matching the per-target diagnostic path below.
        if let Err(err) = expand_target(target, options.mode, &mut expanded) {
            outcome.any_error = true;
            if !options.suppress_errors {
                eprintln!("ungrep: {err}");
            }
        }
    }
    let multi_file = expanded.len() > 1;

    for target in &expanded {
        match process_one_file(target, patterns, options, scheme, &mut out, multi_file, self_ref.as_ref()) {
            Ok(file_outcome) => {
                outcome.any_matched |= file_outcome.matched;
                if options.quiet && outcome.any_matched {
                    return Ok(outcome);
                }
            }
            Err(err) => {
                outcome.any_error = true;
                if !options.suppress_errors {
                    eprintln!("ungrep: {err}");
                }
            }
        }
    }
    Ok(outcome)
}

/// Expand directory targets under recursion into their constituent files;
/// a directory target under [`SearchMode::Flat`] is reported as an error
/// rather than silently skipped (§4.F "apply directory ... policy").
fn expand_target(target: &Target, mode: SearchMode, out: &mut Vec<Target>) -> Result<(), Error> {
    let Target::Path(path) = target else {
        out.push(target.clone());
        return Ok(());
    };

    if !path.is_dir() {
        out.push(target.clone());
        return Ok(());
    }

    match mode {
        SearchMode::Flat => Err(Error::Argument(format!("{}: Is a directory", path.display()))),
        _ => {
            let (rx, handle) = walk_sequential(path, WalkerConfig::default());
            for entry in rx {
                if !entry.is_dir {
                    out.push(Target::Path(entry.path));
                }
            }
            handle.join();
            Ok(())
        }
    }
}

fn target_label(target: &Target) -> String {
    match target {
        Target::Stdin => "(standard input)".to_string(),
        Target::Path(p) => p.display().to_string(),
    }
}

/// (device, inode) of standard output, when it is a regular file — used to
/// detect "the output file is also an input file" (§4.F).
#[cfg(unix)]
fn stdout_self_reference() -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    if !io::stdout().is_terminal() {
        let meta = std::fs::metadata("/dev/stdout").ok()?;
        if meta.is_file() {
            return Some((meta.dev(), meta.ino()));
        }
    }
    None
}

#[cfg(not(unix))]
fn stdout_self_reference() -> Option<(u64, u64)> {
    None
}

#[cfg(unix)]
fn is_same_file(path: &Path, self_ref: Option<&(u64, u64)>) -> bool {
    use std::os::unix::fs::MetadataExt;
    let Some(&(dev, ino)) = self_ref else {
        return false;
    };
    std::fs::metadata(path).map(|m| m.dev() == dev && m.ino() == ino).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_same_file(_path: &Path, _self_ref: Option<&(u64, u64)>) -> bool {
    false
}

/// Search one target end to end: fill the buffer, run the engine, print
/// selected lines, and report whether anything matched.
fn process_one_file<W: io::Write + WriteColor>(
    target: &Target,
    patterns: &PatternSet,
    options: &DriverOptions,
    scheme: &ColorScheme,
    out: &mut W,
    multi_file: bool,
    self_ref: Option<&(u64, u64)>,
) -> Result<FileOutcome, Error> {
    if let Target::Path(path) = target {
        if is_same_file(path, self_ref) {
            return Ok(FileOutcome { matched: false });
        }
    }

    let label = target_label(target);
    let (origin, size_hint, reader): (PathBuf, Option<u64>, Box<dyn Read>) = match target {
        Target::Path(path) => {
            let meta = std::fs::metadata(path).map_err(|e| Error::Io { path: path.clone(), source: e })?;
            if meta.is_dir() {
                return Err(Error::Argument(format!("{}: Is a directory", path.display())));
            }
            let file = File::open(path).map_err(|e| Error::Io { path: path.clone(), source: e })?;
            (path.clone(), Some(meta.len()), Box::new(file))
        }
        Target::Stdin => (PathBuf::from("(standard input)"), None, Box::new(io::stdin())),
    };

    let skip_nuls = options.binary_policy != BinaryPolicy::Text;
    let mut buffer = BufferManager::new(reader, origin, options.eol, skip_nuls, size_hint);
    let engine = MatchEngine::new(patterns, options.eol);
    let with_filename = match options.filename_mode {
        FilenameMode::Always => true,
        FilenameMode::Never => false,
        FilenameMode::Auto => multi_file,
    };
    let head = HeadFields {
        with_filename,
        line_numbers: options.line_numbers,
        byte_offsets: options.byte_offsets,
    };
    let name_for_head = |label: &str| -> Option<PathBuf> { with_filename.then(|| PathBuf::from(label)) };

    let mut match_count = 0usize;
    let mut before_buf: VecDeque<(usize, usize)> = VecDeque::new();
    let mut after_remaining = 0usize;
    // End of the last line actually written to `out` (context or match),
    // used to tell a contiguous context block from one with a dropped
    // line in between (§4.D phase grouping: the latter gets a `--`).
    let mut last_printed_end: Option<usize> = None;

    let line_by_line = options.needs_line_by_line_scan();

    // Scoped so the printer's borrow of `out` ends before the summary
    // lines below (`-c`/`-l`/`-L`) need to write to it directly.
    {
        let mut printer = Printer::new(out, scheme, head, options.colorize, options.only_matching, options.eol);

        'fill: while buffer.fill().map_err(|e| annotate(&e, &label))? {
            let haystack = buffer.window();
            let end = buffer.end();
            let begin = buffer.begin();
            let at_eof = buffer.is_eof();
            // Once a NUL byte has been seen, `binary|without-match` policy
            // never shows raw line content — only the end-of-file notice
            // (§4.C: "reported as binary file matches with no line
            // content, ignored entirely, or treated as text"). `zap_nuls`
            // already ran inside `fill()`, so this chunk's detection is
            // current even for lines about to be scanned below.
            let suppress_binary_print = buffer.is_binary().is_some()
                && matches!(options.binary_policy, BinaryPolicy::Binary | BinaryPolicy::WithoutMatch);

            if line_by_line {
                let mut cursor = begin;
                loop {
                    if hit_limit(options, match_count) {
                        buffer.consume_to(cursor);
                        break 'fill;
                    }
                    let Some((line_start, line_end, next_cursor, terminated)) = next_raw_line(haystack, cursor, end, options.eol) else {
                        buffer.consume_to(cursor);
                        break;
                    };
                    if !terminated && !at_eof {
                        buffer.consume_to(cursor);
                        break;
                    }

                    let is_match = line_matches(&engine, haystack, line_start, end);
                    let selected = is_match != options.invert;

                    if selected {
                        match_count += 1;
                        emit_selected_line(
                            &mut printer,
                            &label,
                            haystack,
                            line_start,
                            line_end,
                            &engine,
                            options,
                            &name_for_head,
                            &mut before_buf,
                            &mut after_remaining,
                            &mut last_printed_end,
                            suppress_binary_print,
                        )?;
                    } else if after_remaining > 0 {
                        if !(options.count_only || options.list_matching_files || options.list_non_matching_files || suppress_binary_print) {
                            print_plain_line(&mut printer, &name_for_head(&label), haystack, line_start, line_end, b'-')?;
                            last_printed_end = Some(line_end);
                        }
                        after_remaining -= 1;
                    } else if options.before_context > 0 && !options.count_only {
                        before_buf.push_back((line_start, line_end));
                        while before_buf.len() > options.before_context {
                            before_buf.pop_front();
                        }
                    }

                    cursor = next_cursor;
                }
            } else {
                let mut cursor = begin;
                loop {
                    if hit_limit(options, match_count) {
                        buffer.consume_to(cursor);
                        break 'fill;
                    }
                    let Some(m) = engine.find(haystack, cursor, end, None) else {
                        buffer.consume_to(cursor);
                        break;
                    };
                    let terminated = haystack.get(m.line_end) == Some(&options.eol);
                    if !terminated && !at_eof {
                        buffer.consume_to(cursor);
                        break;
                    }

                    match_count += 1;
                    if !(options.count_only || options.list_matching_files || options.list_non_matching_files || suppress_binary_print) {
                        let filename = name_for_head(&label);
                        printer
                            .print_line(filename.as_deref(), haystack, &m, b':', Some(&engine))
                            .map_err(|e| annotate(&e, &label))?;
                    }

                    cursor = if terminated { m.line_end + 1 } else { end };
                }
            }

            if let Some(_reason) = buffer.is_binary() {
                if options.binary_policy == BinaryPolicy::WithoutMatch {
                    match_count = 0;
                    break;
                }
                if options.binary_policy == BinaryPolicy::Binary && match_count > 0 {
                    printer.mark_binary_match();
                }
            }
        }

        printer.print_binary_notice(Path::new(&label)).map_err(|e| annotate(&e, &label))?;
    }

    if options.count_only {
        write_count_line(out, &label, match_count, with_filename)?;
    } else if options.list_matching_files && match_count > 0 {
        writeln_path(out, &label)?;
    } else if options.list_non_matching_files && match_count == 0 {
        writeln_path(out, &label)?;
    }

    Ok(FileOutcome { matched: match_count > 0 })
}

fn hit_limit(options: &DriverOptions, match_count: usize) -> bool {
    options.max_matches.is_some_and(|limit| match_count >= limit)
}

#[allow(clippy::too_many_arguments)]
fn emit_selected_line<W: io::Write + WriteColor>(
    printer: &mut Printer<'_, W>,
    label: &str,
    haystack: &[u8],
    line_start: usize,
    line_end: usize,
    engine: &MatchEngine<'_>,
    options: &DriverOptions,
    name_for_head: &impl Fn(&str) -> Option<PathBuf>,
    before_buf: &mut VecDeque<(usize, usize)>,
    after_remaining: &mut usize,
    last_printed_end: &mut Option<usize>,
    suppress_binary_print: bool,
) -> Result<(), Error> {
    if options.count_only || options.list_matching_files || options.list_non_matching_files || suppress_binary_print {
        before_buf.clear();
        *after_remaining = options.after_context;
        return Ok(());
    }

    // The block about to print starts with the first buffered before-context
    // line, or the match itself when there isn't one. A gap exists only when
    // that start doesn't immediately continue the last line we wrote.
    let block_first_start = before_buf.front().map(|&(s, _)| s).unwrap_or(line_start);
    if let Some(prev_end) = *last_printed_end {
        if block_first_start != prev_end + 1 {
            writeln_separator(printer)?;
        }
    }

    for (bs, be) in before_buf.drain(..) {
        print_plain_line(printer, &name_for_head(label), haystack, bs, be, b'-')?;
        *last_printed_end = Some(be);
    }

    let filename = name_for_head(label);
    let m = LineMatch {
        line_start,
        line_end,
        match_start: line_start,
        match_end: line_start,
    };
    printer
        .print_line(filename.as_deref(), haystack, &m, b':', Some(engine))
        .map_err(|e| annotate(&e, label))?;
    *last_printed_end = Some(line_end);
    *after_remaining = options.after_context;
    Ok(())
}

fn print_plain_line<W: io::Write + WriteColor>(
    printer: &mut Printer<'_, W>,
    filename: &Option<PathBuf>,
    haystack: &[u8],
    line_start: usize,
    line_end: usize,
    separator: u8,
) -> Result<(), Error> {
    let m = LineMatch {
        line_start,
        line_end,
        match_start: line_start,
        match_end: line_start,
    };
    printer.print_line(filename.as_deref(), haystack, &m, separator, None).map_err(|e| annotate(&e, "context line"))
}

fn writeln_separator<W: io::Write + WriteColor>(printer: &mut Printer<'_, W>) -> Result<(), Error> {
    printer.print_group_separator().map_err(|e| annotate(&e, "separator"))
}

/// Does the line starting at `line_start` match, without letting the
/// cascade skip ahead to a later line? Reuses the full cascade (keyword
/// prefilter included) and simply checks whether the match it returns
/// still starts on this line.
fn line_matches(engine: &MatchEngine<'_>, haystack: &[u8], line_start: usize, end: usize) -> bool {
    engine.find(haystack, line_start, end, None).map(|m| m.line_start == line_start).unwrap_or(false)
}

/// Split off one raw line starting at `start`. Returns
/// `(line_start, line_end, next_cursor, terminated)`; `terminated` is
/// false when the window ran out before an end-of-line byte was found
/// (an in-progress residue line, or the final line of a file with no
/// trailing terminator).
fn next_raw_line(haystack: &[u8], start: usize, end: usize, eol: u8) -> Option<(usize, usize, usize, bool)> {
    if start >= end {
        return None;
    }
    match memchr::memchr(eol, &haystack[start..end]) {
        Some(offset) => {
            let i = start + offset;
            Some((start, i, i + 1, true))
        }
        None => Some((start, end, end, false)),
    }
}

/// `-c`'s summary line. Written straight to the underlying stream rather
/// than through [`Printer`]: a count isn't a line out of the haystack, so
/// it has no real line-number/byte-offset state to track.
fn write_count_line<W: io::Write>(out: &mut W, label: &str, count: usize, with_filename: bool) -> Result<(), Error> {
    if with_filename {
        writeln!(out, "{label}:{count}")
    } else {
        writeln!(out, "{count}")
    }
    .map_err(Error::WriteFailure)
}

/// `-l`/`-L`'s summary line.
fn writeln_path<W: io::Write>(out: &mut W, label: &str) -> Result<(), Error> {
    writeln!(out, "{label}").map_err(Error::WriteFailure)
}

fn annotate(err: &Error, label: &str) -> Error {
    Error::Internal(format!("{label}: {err}"))
}

/// Parallel recursive search (§4.E), adapting [`crate::walk::parallel`]'s
/// `EntryProcessor` to this driver's per-file scan. Each worker gets its
/// own [`Printer`]/buffer over an in-memory sink, since only the main
/// thread is allowed to write to standard output during a flush (§5).
fn run_parallel_driver(targets: &[Target], patterns: &PatternSet, options: &DriverOptions, scheme: &ColorScheme, color_choice: ColorChoice, worker_count: usize) -> Result<DriverOutcome, Error> {
    use crate::walk::parallel::{run_parallel, EntryProcessor, ProcessedEntry};
    use termcolor::Buffer;

    let root = match targets.first() {
        Some(Target::Path(p)) => p.clone(),
        _ => PathBuf::from("."),
    };

    struct GrepEntry<'p> {
        patterns: &'p PatternSet,
        options: DriverOptions,
        scheme: ColorScheme,
    }

    impl<'p> EntryProcessor for GrepEntry<'p> {
        fn process(&mut self, entry: &ignore::DirEntry) -> ProcessedEntry {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                return ProcessedEntry {
                    bytes: Vec::new(),
                    matched: false,
                    ok: true,
                };
            }
            let mut buf = Buffer::no_color();
            let target = Target::Path(entry.path().to_path_buf());
            match process_one_file(&target, self.patterns, &self.options, &self.scheme, &mut buf, true, None) {
                Ok(outcome) => ProcessedEntry {
                    bytes: buf.as_slice().to_vec(),
                    matched: outcome.matched,
                    ok: true,
                },
                Err(_) => ProcessedEntry {
                    bytes: Vec::new(),
                    matched: false,
                    ok: false,
                },
            }
        }
    }

    let mut out = StandardStream::stdout(color_choice);
    let walker_config = WalkerConfig::default();
    let scheme_owned = scheme.clone();
    let mut options_owned = options.clone();
    options_owned.before_context = 0;
    options_owned.after_context = 0;

    // `on_flush` runs only on this thread (the caller), strictly after each
    // round's workers have joined, so a plain `Cell` is enough to carry a
    // write failure back out without a lock.
    let write_ok = std::cell::Cell::new(true);

    let outcome = run_parallel(
        &root,
        &walker_config,
        worker_count,
        256,
        |_worker_id| GrepEntry {
            patterns,
            options: options_owned.clone(),
            scheme: scheme_owned.clone(),
        },
        |bytes| {
            if out.write_all(bytes).is_err() {
                write_ok.set(false);
            }
        },
    );

    Ok(DriverOutcome {
        any_matched: outcome.any_matched,
        any_error: !outcome.all_ok || !write_ok.get(),
    })
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
