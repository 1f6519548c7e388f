//! WAVESTEP Replay Engine
//!
//! Forward stepping through a parsed trace with derived active-page
//! state, page-activation breakpoints, and step diffs. One engine
//! instance owns one replay session; traces are immutable once loaded.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod engine;
pub mod snapshot;
pub mod state;

pub use diff::{format_page_names, PageDiff};
pub use engine::{StepBoundary, StepOutcome, SteppingEngine};
pub use snapshot::ReplaySnapshot;
pub use state::{PageFilter, ReplayState};
