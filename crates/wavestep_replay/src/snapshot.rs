//! Read-only session snapshots for presentation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wavestep_core::SimTime;

use crate::diff::format_page_names;

/// Point-in-time view of a replay session.
///
/// Produced by the engine for rendering; taking one never mutates the
/// session. Multiple views over the same session are safe because the
/// trace is immutable and the snapshot owns its copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySnapshot {
    /// Whether a trace is loaded at all
    pub loaded: bool,
    /// Current step index, `None` before the first step
    pub position: Option<usize>,
    /// Timestamp at the current position
    pub time: Option<SimTime>,
    /// Currently active pages
    pub active_pages: BTreeSet<String>,
}

impl ReplaySnapshot {
    /// Render the active-page listing with the given display limit
    #[must_use]
    pub fn pages_display(&self, limit: usize) -> String {
        format_page_names(&self.active_pages, limit)
    }
}

impl std::fmt::Display for ReplaySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.loaded {
            return write!(f, "no trace loaded");
        }
        match (self.position, self.time) {
            (Some(pos), Some(time)) => write!(f, "step {pos} at {time}"),
            _ => write!(f, "not started"),
        }
    }
}
