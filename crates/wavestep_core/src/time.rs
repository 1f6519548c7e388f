//! Simulation time for WAVESTEP.
//!
//! VCD timestamps are plain integers in timescale units. The replayer
//! never converts them to wall-clock time; ordering is all that matters.

use serde::{Deserialize, Serialize};

/// Simulation time - a VCD timestamp in timescale units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Create a new simulation time at zero
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Create from raw value
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get raw value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// True if this is the synthetic pre-clock initialization time
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for SimTime {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
