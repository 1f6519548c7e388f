//! Immutable trace model: ordered change-sets keyed by timestamp.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wavestep_core::{SignalValue, SimTime};

/// All value changes recorded at one timestamp.
///
/// Keys are signal names resolved through the signal table; only
/// signals that actually changed at this timestamp appear. Duplicate
/// changes for one signal within a timestamp keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    changes: IndexMap<String, SignalValue>,
}

impl ChangeSet {
    /// Create an empty change-set
    #[must_use]
    pub fn new() -> Self {
        Self {
            changes: IndexMap::new(),
        }
    }

    /// Record a change, overwriting any earlier value for the signal
    pub fn record(&mut self, name: &str, value: SignalValue) {
        self.changes.insert(name.to_string(), value);
    }

    /// Value recorded for a signal, if any
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.changes.get(name)
    }

    /// Number of changed signals
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// True if nothing changed at this timestamp
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterate (name, value) pairs in recording order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalValue)> {
        self.changes.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// An ordered sequence of (timestamp, change-set) pairs.
///
/// Timestamps are strictly ascending with no duplicates; index 0 is the
/// earliest time, normally the synthetic time 0 holding pre-clock
/// initialization values. Immutable once parsing completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    times: Vec<SimTime>,
    sets: Vec<ChangeSet>,
}

impl Trace {
    /// Build a trace from pairs already sorted ascending by time.
    ///
    /// The parser guarantees ordering by collecting change-sets in a
    /// time-keyed sorted map; this constructor just splits the pairs.
    #[must_use]
    pub(crate) fn from_ordered(pairs: Vec<(SimTime, ChangeSet)>) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
        let (times, sets) = pairs.into_iter().unzip();
        Self { times, sets }
    }

    /// Number of distinct timestamps
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if the trace holds no timestamps at all
    ///
    /// Parsed traces are never empty; even a header-only dump yields
    /// one empty change-set at time 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Timestamp at a position
    #[must_use]
    pub fn time_at(&self, index: usize) -> Option<SimTime> {
        self.times.get(index).copied()
    }

    /// Change-set at a position
    #[must_use]
    pub fn changes_at(&self, index: usize) -> Option<&ChangeSet> {
        self.sets.get(index)
    }

    /// The ordered timestamp list
    #[must_use]
    pub fn times(&self) -> &[SimTime] {
        &self.times
    }

    /// Iterate (timestamp, change-set) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (SimTime, &ChangeSet)> {
        self.times.iter().copied().zip(self.sets.iter())
    }
}
