//! Tolerant line-oriented VCD parser.
//!
//! Consumes the VCD subset the replayer cares about: `$var`
//! declarations in the header, `#<integer>` timestamp markers, scalar
//! changes (`1!`), and vector changes (`b101 !`). Malformed lines are
//! skipped and counted in [`ParseDiagnostics`]; only unreadable input
//! is an error. The result is a pure function of the input text.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wavestep_core::{CoreError, CoreResult, SignalValue, SimTime};

use crate::diagnostics::ParseDiagnostics;
use crate::signal_table::SignalTable;
use crate::trace::{ChangeSet, Trace};

/// Everything a successful parse produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTrace {
    /// The ordered trace of change-sets
    pub trace: Trace,
    /// Code-to-name resolution built from the header
    pub signals: SignalTable,
    /// Skipped-line counters
    pub diagnostics: ParseDiagnostics,
}

/// Parse a VCD dump from a file.
///
/// # Errors
///
/// Returns [`CoreError::TraceUnreadable`] if the file cannot be read.
/// Malformed content never fails; see [`parse_str`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> CoreResult<ParsedTrace> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| CoreError::TraceUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(parse_str(&text))
}

/// Parse a VCD dump from text.
///
/// Always succeeds: bad lines are dropped and counted so that
/// partially-corrupt captures salvage as much as possible. An empty or
/// header-only input yields a trace with a single empty change-set at
/// time 0, which also holds any values dumped before the first
/// timestamp marker.
#[must_use]
pub fn parse_str(text: &str) -> ParsedTrace {
    let mut signals = SignalTable::new();
    let mut diagnostics = ParseDiagnostics::default();
    let mut in_header = true;
    let mut current = SimTime::zero();

    // Keyed by raw time so duplicate markers reuse one change-set and
    // out-of-order markers still come out sorted.
    let mut by_time: BTreeMap<u64, ChangeSet> = BTreeMap::new();
    by_time.insert(0, ChangeSet::new());

    for raw_line in text.lines() {
        diagnostics.lines_total += 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if in_header {
            if line.starts_with("$var") {
                // $var <type> <width> <code> <name> $end
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.len() >= 5 {
                    signals.define(tokens[3], tokens[4]);
                } else {
                    tracing::debug!(line, "skipping short $var declaration");
                    diagnostics.bad_declarations += 1;
                }
            } else if line.starts_with("$enddefinitions") {
                in_header = false;
            }
            // Other header content (scopes, timescale, comments) is
            // irrelevant to replay.
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            match rest.trim().parse::<u64>() {
                Ok(t) => {
                    current = SimTime::from_raw(t);
                    by_time.entry(t).or_default();
                }
                Err(_) => {
                    tracing::debug!(line, "skipping bad timestamp marker");
                    diagnostics.bad_timestamps += 1;
                }
            }
            continue;
        }

        // Simulator directives in the body ($dumpvars, $end) carry no
        // values of their own.
        if line.starts_with('$') {
            continue;
        }

        let first = line.chars().next().unwrap_or_default();
        if let Some(scalar) = wavestep_core::Scalar::from_symbol(first) {
            let code = line[1..].trim();
            record_change(
                &signals,
                &mut by_time,
                current,
                code,
                SignalValue::Scalar(scalar),
                &mut diagnostics,
            );
        } else if matches!(first, 'b' | 'B') {
            let tokens: Vec<&str> = line[1..].split_whitespace().collect();
            if tokens.len() < 2 {
                tracing::debug!(line, "skipping vector change without code");
                diagnostics.unrecognized += 1;
                continue;
            }
            match SignalValue::vector(tokens[0]) {
                Ok(value) => {
                    record_change(&signals, &mut by_time, current, tokens[1], value, &mut diagnostics);
                }
                Err(e) => {
                    tracing::debug!(line, error = %e, "skipping bad vector value");
                    diagnostics.bad_values += 1;
                }
            }
        } else {
            tracing::debug!(line, "skipping unrecognized line");
            diagnostics.unrecognized += 1;
        }
    }

    let trace = Trace::from_ordered(
        by_time
            .into_iter()
            .map(|(t, set)| (SimTime::from_raw(t), set))
            .collect(),
    );

    tracing::debug!(
        timestamps = trace.len(),
        signals = signals.len(),
        skipped = diagnostics.skipped_total(),
        "parsed trace"
    );

    ParsedTrace {
        trace,
        signals,
        diagnostics,
    }
}

fn record_change(
    signals: &SignalTable,
    by_time: &mut BTreeMap<u64, ChangeSet>,
    current: SimTime,
    code: &str,
    value: SignalValue,
    diagnostics: &mut ParseDiagnostics,
) {
    match signals.resolve(code) {
        Some(name) => {
            by_time
                .entry(current.as_u64())
                .or_default()
                .record(name, value);
        }
        None => {
            tracing::debug!(code, "dropping change for unresolved code");
            diagnostics.unresolved_codes += 1;
        }
    }
}
