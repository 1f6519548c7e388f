//! Line-oriented command shell over the stepping engine.
//!
//! The shell owns argument parsing and text rendering; every replay
//! decision is delegated to [`SteppingEngine`]. Input and output are
//! generic over `BufRead`/`Write` so a command script can be piped in,
//! which is also how the tests drive it.

use std::io::{self, BufRead, Write};

use wavestep_replay::{StepBoundary, StepOutcome, SteppingEngine};
use wavestep_vcd::parse_file;

/// Display cap for page-name listings
pub const PAGE_DISPLAY_LIMIT: usize = 50;

/// A shell command parsed from one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Print the command summary
    Help,
    /// Leave the shell
    Quit,
    /// Load a trace file, replacing the session
    LoadTrace {
        /// Path to the VCD file
        path: String,
    },
    /// Advance a number of steps
    SingleStep {
        /// Step count, at least 0
        count: usize,
    },
    /// Advance to the next visible page change
    PageStep,
    /// Halt future stepping when a page becomes active
    Break {
        /// Page name
        page: String,
    },
    /// Remove a page breakpoint
    Unbreak {
        /// Page name
        page: String,
    },
    /// List registered breakpoints
    Breakpoints,
    /// Show position, timestamp, and active pages
    Registers,
}

/// Parse one input line.
///
/// Returns `Ok(None)` for a blank line. Malformed input, including
/// non-integer step counts, is rejected here so the engine only ever
/// sees valid arguments.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&cmd) = parts.first() else {
        return Ok(None);
    };

    let command = match (cmd, parts.len()) {
        ("help", 1) => ShellCommand::Help,
        ("quit", 1) => ShellCommand::Quit,
        ("load-trace", 2) => ShellCommand::LoadTrace {
            path: parts[1].to_string(),
        },
        ("single-step", 1) => ShellCommand::SingleStep { count: 1 },
        ("single-step", 2) => {
            let count = parts[1]
                .parse::<usize>()
                .map_err(|_| format!("step count must be a non-negative integer, got {:?}", parts[1]))?;
            ShellCommand::SingleStep { count }
        }
        ("page-step", 1) => ShellCommand::PageStep,
        ("break", 2) => ShellCommand::Break {
            page: parts[1].to_string(),
        },
        ("unbreak", 2) => ShellCommand::Unbreak {
            page: parts[1].to_string(),
        },
        ("breakpoints", 1) => ShellCommand::Breakpoints,
        ("registers", 1) => ShellCommand::Registers,
        _ => return Err("no valid command (try 'help')".to_string()),
    };
    Ok(Some(command))
}

/// Run the interactive loop until `quit` or end of input.
///
/// Bad input and replay boundaries are printed and the loop continues;
/// nothing a user types terminates the session unexpectedly.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run_repl<R: BufRead, W: Write>(
    engine: &mut SteppingEngine,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    loop {
        write!(output, "wavestep> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => execute(engine, &command, output)?,
            Err(message) => writeln!(output, "{message}")?,
        }
    }
    Ok(())
}

/// Load a trace into the engine, reporting the result.
///
/// On failure the current session is left untouched.
///
/// # Errors
///
/// Returns an error only if writing output fails.
pub fn load_trace<W: Write>(
    engine: &mut SteppingEngine,
    path: &str,
    output: &mut W,
) -> io::Result<()> {
    match parse_file(path) {
        Ok(parsed) => {
            if !parsed.diagnostics.is_clean() {
                tracing::warn!(%path, diagnostics = %parsed.diagnostics, "trace loaded with skipped lines");
                writeln!(output, "warning: {}", parsed.diagnostics)?;
            }
            writeln!(
                output,
                "loaded {} timestamps, {} signals",
                parsed.trace.len(),
                parsed.signals.len()
            )?;
            engine.load(parsed.trace);
        }
        Err(e) => {
            writeln!(output, "load failed: {e}")?;
        }
    }
    Ok(())
}

fn execute<W: Write>(
    engine: &mut SteppingEngine,
    command: &ShellCommand,
    output: &mut W,
) -> io::Result<()> {
    match command {
        ShellCommand::Help => writeln!(output, "{}", help_text()),
        ShellCommand::Quit => Ok(()),
        ShellCommand::LoadTrace { path } => load_trace(engine, path, output),
        ShellCommand::SingleStep { count } => {
            let outcome = engine.step(*count);
            report_outcome(&outcome, output)
        }
        ShellCommand::PageStep => {
            let outcome = engine.seek_page_change();
            report_outcome(&outcome, output)
        }
        ShellCommand::Break { page } => {
            if engine.add_page_breakpoint(page) {
                writeln!(output, "breakpoint set on {page}")
            } else {
                writeln!(output, "breakpoint already set on {page}")
            }
        }
        ShellCommand::Unbreak { page } => {
            if engine.remove_page_breakpoint(page) {
                writeln!(output, "breakpoint removed from {page}")
            } else {
                writeln!(output, "no breakpoint on {page}")
            }
        }
        ShellCommand::Breakpoints => {
            let breakpoints = engine.breakpoints();
            if breakpoints.is_empty() {
                writeln!(output, "no breakpoints set")
            } else {
                for page in breakpoints {
                    writeln!(output, "  {page}")?;
                }
                Ok(())
            }
        }
        ShellCommand::Registers => {
            let snapshot = engine.snapshot();
            writeln!(output, "{snapshot}")?;
            if snapshot.loaded {
                writeln!(
                    output,
                    "active pages: {}",
                    snapshot.pages_display(PAGE_DISPLAY_LIMIT)
                )?;
            }
            Ok(())
        }
    }
}

fn report_outcome<W: Write>(outcome: &StepOutcome, output: &mut W) -> io::Result<()> {
    match outcome.boundary {
        StepBoundary::NoTrace => return writeln!(output, "no trace loaded"),
        StepBoundary::EndOfTrace if outcome.steps_taken == 0 => {
            return writeln!(output, "at end of trace");
        }
        _ => {}
    }

    match (outcome.position, outcome.time) {
        (Some(position), Some(time)) => writeln!(
            output,
            "advanced {} step(s) to step {position} at {time}",
            outcome.steps_taken
        )?,
        _ => writeln!(output, "advanced {} step(s)", outcome.steps_taken)?,
    }

    if !outcome.diff.added.is_empty() {
        writeln!(
            output,
            "pages on:  {}",
            wavestep_replay::format_page_names(&outcome.diff.added, PAGE_DISPLAY_LIMIT)
        )?;
    }
    if !outcome.diff.removed.is_empty() {
        writeln!(
            output,
            "pages off: {}",
            wavestep_replay::format_page_names(&outcome.diff.removed, PAGE_DISPLAY_LIMIT)
        )?;
    }
    if outcome.halted_on_breakpoint {
        writeln!(output, "halted on breakpoint")?;
    }
    if outcome.boundary == StepBoundary::EndOfTrace {
        writeln!(output, "reached end of trace")?;
    }
    Ok(())
}

fn help_text() -> &'static str {
    "Available commands:\n\
     \x20 help                 show this text\n\
     \x20 quit                 leave the shell\n\
     \x20 load-trace <path>    load a VCD trace, replacing the session\n\
     \x20 single-step [n]      advance n steps (default 1)\n\
     \x20 page-step            advance to the next page change\n\
     \x20 break <page>         halt when the page becomes active\n\
     \x20 unbreak <page>       remove a page breakpoint\n\
     \x20 breakpoints          list page breakpoints\n\
     \x20 registers            show position, time, and active pages"
}
