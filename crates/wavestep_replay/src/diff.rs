//! Page diffs: which pages became active or inactive across a step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Added/removed active-page sets for one step or a range of steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDiff {
    /// Pages that entered the active set
    pub added: BTreeSet<String>,
    /// Pages that left the active set
    pub removed: BTreeSet<String>,
}

impl PageDiff {
    /// Create an empty diff
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set difference between two active-page snapshots
    #[must_use]
    pub fn between(before: &BTreeSet<String>, after: &BTreeSet<String>) -> Self {
        Self {
            added: after.difference(before).cloned().collect(),
            removed: before.difference(after).cloned().collect(),
        }
    }

    /// True if nothing changed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Fold another diff into this one
    pub fn merge(&mut self, other: &PageDiff) {
        self.added.extend(other.added.iter().cloned());
        self.removed.extend(other.removed.iter().cloned());
    }
}

/// Render a page-name set for display, truncating past `limit`.
///
/// Names come out in lexicographic order (the set's order) with a
/// `(+n more)` suffix when truncated. The underlying sets are always
/// complete; truncation is purely a display convention, and callers
/// pick the limit.
#[must_use]
pub fn format_page_names(names: &BTreeSet<String>, limit: usize) -> String {
    if names.is_empty() {
        return "(none)".to_string();
    }
    let shown: Vec<&str> = names.iter().take(limit).map(String::as_str).collect();
    let hidden = names.len().saturating_sub(limit);
    if hidden > 0 {
        format!("{} (+{} more)", shown.join(", "), hidden)
    } else {
        shown.join(", ")
    }
}
