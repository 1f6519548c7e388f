//! Live replay session state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wavestep_core::SignalValue;

use crate::diff::PageDiff;

/// Predicate deciding which signals count as pages.
///
/// The dump format does not mark page signals; which names qualify is
/// session configuration, fixed when the engine is built. `All` treats
/// every signal as a page, `Prefix` restricts to a name prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFilter {
    /// Every signal is a page
    #[default]
    All,
    /// Only signals whose name starts with the prefix
    Prefix(String),
}

impl PageFilter {
    /// Every signal is a page
    #[must_use]
    pub fn all() -> Self {
        Self::All
    }

    /// Only signals whose name starts with `prefix`
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Whether a signal name qualifies as a page
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Prefix(p) => name.starts_with(p),
        }
    }
}

/// Mutable state of one replay session.
///
/// `active_pages` is derived state: it must always equal the subset of
/// `current_values` entries that are logic high and satisfy the page
/// filter. The stepping engine maintains it incrementally;
/// [`ReplayState::derived_active_pages`] recomputes it from scratch for
/// verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayState {
    /// Index into the trace, `None` before the first step
    pub position: Option<usize>,
    /// Most recently observed value of every signal seen so far
    pub current_values: IndexMap<String, SignalValue>,
    /// Pages currently active
    pub active_pages: BTreeSet<String>,
    /// Added/removed sets from the most recent step call
    pub last_diff: PageDiff,
}

impl ReplayState {
    /// Create a fresh, unstarted session state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything back to the unstarted state
    pub fn reset(&mut self) {
        self.position = None;
        self.current_values.clear();
        self.active_pages.clear();
        self.last_diff = PageDiff::new();
    }

    /// True once at least one step has been taken
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.position.is_some()
    }

    /// Recompute the active-page set from `current_values`.
    ///
    /// Reference implementation of the derived-state invariant, used by
    /// tests to check the incremental bookkeeping never drifts.
    #[must_use]
    pub fn derived_active_pages(&self, filter: &PageFilter) -> BTreeSet<String> {
        self.current_values
            .iter()
            .filter(|(name, value)| value.is_high() && filter.matches(name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
