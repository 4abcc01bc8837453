// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ungrep CLI entry point: env/`GREP_OPTIONS` expansion, pattern and
//! target resolution, then handoff to [`ungrep::driver::run`].

use std::fs;
use std::io::Read;

use clap::Parser;
use termcolor::ColorChoice;
use tracing_subscriber::{fmt, EnvFilter};

use ungrep::cli::Cli;
use ungrep::color::{resolve_color, ColorScheme};
use ungrep::driver::{self, DriverOptions, FilenameMode, ModeRequest, Target};
use ungrep::env::{expand_grep_options, ColorCapabilities};
use ungrep::error::ExitCode;
use ungrep::pattern::{compile, CompileOptions, PatternSource};
use ungrep::Error;

fn init_logging() {
    let filter = EnvFilter::try_from_env("UNGREP_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ungrep: {e}");
            ExitCode::from(&e)
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> Result<ExitCode, Error> {
    let mut argv = std::env::args();
    let argv0 = argv.next().unwrap_or_else(|| "ungrep".to_string());
    let expanded = expand_grep_options(argv0, argv.collect());
    let cli = Cli::parse_from(expanded);

    let (inline_pattern, files) = cli.pattern_and_files();
    let sources = pattern_sources(&cli, inline_pattern)?;
    let patterns = compile(
        &sources,
        cli.dialect(),
        cli.eol(),
        CompileOptions {
            ignore_case: cli.ignore_case,
            whole_word: cli.word_regexp,
            whole_line: cli.line_regexp,
        },
    )?;

    let targets: Vec<Target> = if files.is_empty() {
        vec![Target::Stdin]
    } else {
        files.into_iter().map(Target::Path).collect()
    };

    let (before_context, after_context) = cli.effective_context();
    let mode = driver::resolve_mode(&ModeRequest {
        recurse: cli.wants_recursion(),
        explicit_worker_count: cli.jobs,
        implied_worker_count: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        has_context: before_context > 0 || after_context > 0,
        has_whole_word: cli.word_regexp,
        has_include_exclude: false,
        line_buffered: false,
    })?;

    let (force_color, no_color) = cli.color_inputs();
    let color_choice = resolve_color(force_color, no_color);
    let scheme = ColorScheme::from_capabilities(&ColorCapabilities::from_env());

    let filename_mode = if cli.no_filename {
        FilenameMode::Never
    } else if cli.with_filename {
        FilenameMode::Always
    } else {
        FilenameMode::Auto
    };

    let options = DriverOptions {
        eol: cli.eol(),
        invert: cli.invert_match,
        count_only: cli.count,
        list_matching_files: cli.files_with_matches,
        list_non_matching_files: cli.files_without_match,
        max_matches: cli.max_count,
        quiet: cli.quiet,
        suppress_errors: cli.no_messages,
        filename_mode,
        line_numbers: cli.line_number,
        byte_offsets: cli.byte_offset,
        // termcolor's `StandardStream` already decides, per `color_choice`,
        // whether `set_color`/`reset` actually emit SGR codes (e.g. `Auto`
        // on a non-tty is a no-op); this only gates whether the printer
        // bothers to ask at all.
        colorize: color_choice != ColorChoice::Never,
        only_matching: cli.only_matching,
        binary_policy: cli.binary_files.into(),
        before_context,
        after_context,
        mode,
    };

    let outcome = driver::run(&targets, &patterns, &options, &scheme, color_choice)?;
    Ok(outcome.exit_code(cli.quiet))
}

/// Gather `-e`/`-f`/positional pattern sources in command-line order:
/// inline positional pattern first, then `-e` values, then `-f` file
/// contents. Order only affects error-message ordering, never what's
/// matched, since `compile` joins every source's lines by alternation.
fn pattern_sources(cli: &Cli, inline_pattern: Option<String>) -> Result<Vec<PatternSource>, Error> {
    let mut sources = Vec::new();

    if let Some(pattern) = inline_pattern {
        sources.push(PatternSource {
            blob: pattern.into_bytes(),
            file: None,
        });
    }

    for pat in &cli.regexp {
        sources.push(PatternSource {
            blob: pat.clone().into_bytes(),
            file: None,
        });
    }

    for path in &cli.pattern_file {
        let (blob, file) = if path.as_os_str() == "-" {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|source| Error::Io { path: path.clone(), source })?;
            (buf, Some("-".to_string()))
        } else {
            let blob = fs::read(path).map_err(|source| Error::Io { path: path.clone(), source })?;
            (blob, Some(path.display().to_string()))
        };
        sources.push(PatternSource { blob, file });
    }

    if sources.is_empty() {
        return Err(Error::Argument("no pattern specified".to_string()));
    }

    Ok(sources)
}
