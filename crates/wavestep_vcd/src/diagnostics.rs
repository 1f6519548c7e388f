//! Parse diagnostics: skipped-line counters by reason.
//!
//! Tolerant line-skipping is an explicit policy of the parser, not an
//! accident. These counters make the policy observable so tests and the
//! shell can report how much of a dump was salvaged.

use serde::{Deserialize, Serialize};

/// Counts of lines the parser skipped, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    /// Total lines seen, including blank ones
    pub lines_total: usize,
    /// `$var` declarations with too few fields
    pub bad_declarations: usize,
    /// Value changes whose identifier code resolved to no signal
    pub unresolved_codes: usize,
    /// `#` markers that did not parse as an integer
    pub bad_timestamps: usize,
    /// Value changes with symbols outside the value alphabet
    pub bad_values: usize,
    /// Body lines matching no recognized shape
    pub unrecognized: usize,
}

impl ParseDiagnostics {
    /// Total skipped lines across all reasons
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.bad_declarations
            + self.unresolved_codes
            + self.bad_timestamps
            + self.bad_values
            + self.unrecognized
    }

    /// True if every line parsed cleanly
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped_total() == 0
    }
}

impl std::fmt::Display for ParseDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lines, {} skipped ({} declarations, {} unresolved, {} timestamps, {} values, {} unrecognized)",
            self.lines_total,
            self.skipped_total(),
            self.bad_declarations,
            self.unresolved_codes,
            self.bad_timestamps,
            self.bad_values,
            self.unrecognized,
        )
    }
}
