//! The stepping engine: forward replay over a loaded trace.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wavestep_core::SimTime;
use wavestep_vcd::Trace;

use crate::diff::PageDiff;
use crate::snapshot::ReplaySnapshot;
use crate::state::{PageFilter, ReplayState};

/// Why a step call stopped short, if it did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepBoundary {
    /// The call ran to completion (or halted on a breakpoint)
    #[default]
    None,
    /// The end of the trace was reached
    EndOfTrace,
    /// No trace is loaded
    NoTrace,
}

/// Result of a step or seek call.
///
/// Boundaries and breakpoint halts are ordinary results; stepping never
/// fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Steps actually performed, which may be fewer than requested
    pub steps_taken: usize,
    /// Position after the call, `None` if no step has ever been taken
    pub position: Option<usize>,
    /// Timestamp at the new position
    pub time: Option<SimTime>,
    /// Pages that became active or inactive during the call
    pub diff: PageDiff,
    /// True if a page breakpoint cut the call short
    pub halted_on_breakpoint: bool,
    /// Boundary condition hit, if any
    pub boundary: StepBoundary,
}

impl StepOutcome {
    fn no_trace() -> Self {
        Self {
            boundary: StepBoundary::NoTrace,
            ..Self::default()
        }
    }
}

/// Owns one replay session: the loaded trace, the live state, and the
/// breakpoint registry.
///
/// Stepping is forward-only. Breakpoints are page names, not trace
/// positions, so they survive `load`; everything else in the session is
/// reset when a new trace comes in.
#[derive(Debug, Clone, Default)]
pub struct SteppingEngine {
    filter: PageFilter,
    trace: Option<Trace>,
    state: ReplayState,
    breakpoints: BTreeSet<String>,
}

impl SteppingEngine {
    /// Create an unloaded engine treating every signal as a page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the page predicate
    #[must_use]
    pub fn with_filter(mut self, filter: PageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The configured page predicate
    #[must_use]
    pub fn filter(&self) -> &PageFilter {
        &self.filter
    }

    /// True once a trace has been loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.trace.is_some()
    }

    /// The live session state, read-only
    #[must_use]
    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    /// Install a trace, replacing any previous session.
    ///
    /// Position, accumulated values, active pages, and the last diff
    /// are cleared; the breakpoint registry is kept.
    pub fn load(&mut self, trace: Trace) {
        tracing::debug!(timestamps = trace.len(), "loading trace");
        self.trace = Some(trace);
        self.state.reset();
    }

    /// Advance up to `count` change-sets.
    ///
    /// Each consumed change-set is applied atomically: all of its
    /// values land in the session, active pages are adjusted, and only
    /// then are breakpoints evaluated against the pages that newly
    /// became active. A hit stops the call after that change-set, with
    /// the change-set's effects kept. Stepping at the end of the trace,
    /// or with no trace loaded, performs zero steps and says so in the
    /// outcome's boundary.
    pub fn step(&mut self, count: usize) -> StepOutcome {
        let Some(trace) = self.trace.as_ref() else {
            return StepOutcome::no_trace();
        };

        let before = self.state.active_pages.clone();
        let mut steps_taken = 0;
        let mut halted = false;
        let mut boundary = StepBoundary::None;

        while steps_taken < count {
            let next = self.state.position.map_or(0, |p| p + 1);
            let Some(changes) = trace.changes_at(next) else {
                boundary = StepBoundary::EndOfTrace;
                break;
            };

            let mut newly_active: Vec<&str> = Vec::new();
            for (name, value) in changes.iter() {
                self.state
                    .current_values
                    .insert(name.to_string(), value.clone());
                if value.is_high() && self.filter.matches(name) {
                    if self.state.active_pages.insert(name.to_string()) {
                        newly_active.push(name);
                    }
                } else {
                    self.state.active_pages.remove(name);
                }
            }
            self.state.position = Some(next);
            steps_taken += 1;

            if newly_active.iter().any(|n| self.breakpoints.contains(*n)) {
                tracing::debug!(position = next, "halting on page breakpoint");
                halted = true;
                break;
            }
        }

        let diff = PageDiff::between(&before, &self.state.active_pages);
        self.state.last_diff = diff.clone();

        let position = self.state.position;
        StepOutcome {
            steps_taken,
            position,
            time: position.and_then(|p| trace.time_at(p)),
            diff,
            halted_on_breakpoint: halted,
            boundary,
        }
    }

    /// Step until visible page activity changes.
    ///
    /// Single-steps until a step yields a non-empty page diff, a
    /// breakpoint halts, or the trace ends, whichever comes first. The
    /// returned outcome counts every underlying step. There is no
    /// interrupt point between steps; a caller that needs a bound
    /// should loop over [`step`](Self::step) with count 1 itself.
    pub fn seek_page_change(&mut self) -> StepOutcome {
        let mut total = 0;
        loop {
            let mut outcome = self.step(1);
            total += outcome.steps_taken;
            if outcome.steps_taken == 0
                || outcome.halted_on_breakpoint
                || !outcome.diff.is_empty()
            {
                outcome.steps_taken = total;
                return outcome;
            }
        }
    }

    /// Register a page breakpoint. Returns false if already present.
    pub fn add_page_breakpoint(&mut self, name: &str) -> bool {
        self.breakpoints.insert(name.to_string())
    }

    /// Remove a page breakpoint. Returns false if it was not set;
    /// that is a status, not an error.
    pub fn remove_page_breakpoint(&mut self, name: &str) -> bool {
        self.breakpoints.remove(name)
    }

    /// Registered breakpoints in lexicographic order
    #[must_use]
    pub fn breakpoints(&self) -> Vec<&str> {
        self.breakpoints.iter().map(String::as_str).collect()
    }

    /// Read-only view of the session for presentation
    #[must_use]
    pub fn snapshot(&self) -> ReplaySnapshot {
        ReplaySnapshot {
            loaded: self.is_loaded(),
            position: self.state.position,
            time: self
                .state
                .position
                .and_then(|p| self.trace.as_ref().and_then(|t| t.time_at(p))),
            active_pages: self.state.active_pages.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wavestep_vcd::parse_str;

    const SAMPLE: &str = "$var wire 1 ! _0 $end\n\
                          $enddefinitions $end\n\
                          #0\n\
                          1!\n\
                          #5\n\
                          0!\n";

    fn loaded_engine(text: &str) -> SteppingEngine {
        let mut engine = SteppingEngine::new();
        engine.load(parse_str(text).trace);
        engine
    }

    #[test]
    fn test_step_with_no_trace_is_a_boundary() {
        let mut engine = SteppingEngine::new();
        let outcome = engine.step(3);
        assert_eq!(outcome.boundary, StepBoundary::NoTrace);
        assert_eq!(outcome.steps_taken, 0);
        assert!(!engine.snapshot().loaded);
    }

    #[test]
    fn test_sample_trace_stepping() {
        let mut engine = loaded_engine(SAMPLE);

        let first = engine.step(1);
        assert_eq!(first.steps_taken, 1);
        assert_eq!(first.position, Some(0));
        assert_eq!(first.time, Some(SimTime::zero()));
        assert!(first.diff.added.contains("_0"));
        assert_eq!(engine.state().active_pages.len(), 1);

        let second = engine.step(1);
        assert_eq!(second.position, Some(1));
        assert_eq!(second.time, Some(SimTime::from_raw(5)));
        assert!(second.diff.removed.contains("_0"));
        assert!(engine.state().active_pages.is_empty());
    }

    #[test]
    fn test_step_zero_is_a_noop() {
        let mut engine = loaded_engine(SAMPLE);
        engine.step(1);
        let state_before = engine.state().clone();

        let outcome = engine.step(0);
        assert_eq!(outcome.steps_taken, 0);
        assert!(!outcome.halted_on_breakpoint);
        assert_eq!(engine.state().position, state_before.position);
        assert_eq!(engine.state().current_values, state_before.current_values);
        assert_eq!(engine.state().active_pages, state_before.active_pages);
    }

    #[test]
    fn test_step_past_end_is_a_boundary() {
        let mut engine = loaded_engine(SAMPLE);
        engine.step(2);

        let outcome = engine.step(1);
        assert_eq!(outcome.steps_taken, 0);
        assert_eq!(outcome.boundary, StepBoundary::EndOfTrace);
        assert_eq!(outcome.position, Some(1));
        assert!(outcome.diff.is_empty());
    }

    #[test]
    fn test_step_consumes_partial_count_at_end() {
        let mut engine = loaded_engine(SAMPLE);
        let outcome = engine.step(10);
        assert_eq!(outcome.steps_taken, 2);
        assert_eq!(outcome.boundary, StepBoundary::EndOfTrace);
    }

    #[test]
    fn test_last_diff_retained_for_reporting() {
        let mut engine = loaded_engine(SAMPLE);
        engine.step(1);
        assert!(engine.state().last_diff.added.contains("_0"));
        engine.step(1);
        assert!(engine.state().last_diff.removed.contains("_0"));
    }

    #[test]
    fn test_breakpoint_halts_run() {
        let mut engine = loaded_engine(SAMPLE);
        engine.add_page_breakpoint("_0");

        let outcome = engine.step(10);
        assert_eq!(outcome.steps_taken, 1);
        assert!(outcome.halted_on_breakpoint);
        assert_eq!(outcome.boundary, StepBoundary::None);
        // The halting change-set is still applied.
        assert!(engine.state().active_pages.contains("_0"));
    }

    #[test]
    fn test_halt_position_is_deterministic() {
        let positions: Vec<Option<usize>> = (0..3)
            .map(|_| {
                let mut engine = loaded_engine(SAMPLE);
                engine.add_page_breakpoint("_0");
                engine.step(100).position
            })
            .collect();
        assert!(positions.iter().all(|p| *p == positions[0]));
    }

    #[test]
    fn test_already_active_page_does_not_retrigger() {
        let text = "$var wire 1 ! p $end\n\
                    $var wire 1 \" q $end\n\
                    $enddefinitions $end\n\
                    #0\n\
                    1!\n\
                    #1\n\
                    1!\n\
                    1\"\n";
        let mut engine = loaded_engine(text);
        engine.add_page_breakpoint("p");

        let outcome = engine.step(1);
        assert!(outcome.halted_on_breakpoint);

        // p stays high at #1; only q newly activates, so no halt on p.
        let outcome = engine.step(1);
        assert!(!outcome.halted_on_breakpoint);
        assert!(outcome.diff.added.contains("q"));
    }

    #[test]
    fn test_change_set_applies_atomically() {
        let text = "$var wire 1 ! a $end\n\
                    $var wire 1 \" b $end\n\
                    $enddefinitions $end\n\
                    #0\n\
                    1!\n\
                    1\"\n";
        let mut engine = loaded_engine(text);

        let outcome = engine.step(1);
        assert_eq!(outcome.steps_taken, 1);
        assert_eq!(outcome.diff.added.len(), 2);
    }

    #[test]
    fn test_seek_page_change_skips_quiet_timestamps() {
        let text = "$var wire 1 ! page_0 $end\n\
                    $enddefinitions $end\n\
                    #0\n\
                    0!\n\
                    #1\n\
                    #2\n\
                    #3\n\
                    #4\n\
                    1!\n";
        let mut engine = loaded_engine(text);

        let outcome = engine.seek_page_change();
        assert_eq!(outcome.steps_taken, 5);
        assert_eq!(outcome.position, Some(4));
        assert!(outcome.diff.added.contains("page_0"));
    }

    #[test]
    fn test_seek_page_change_stops_on_breakpoint() {
        let text = "$var wire 1 ! p $end\n\
                    $var wire 1 \" q $end\n\
                    $enddefinitions $end\n\
                    #0\n\
                    #1\n\
                    1\"\n\
                    #2\n\
                    1!\n";
        let mut engine = loaded_engine(text);
        engine.add_page_breakpoint("q");

        let outcome = engine.seek_page_change();
        assert!(outcome.halted_on_breakpoint);
        assert_eq!(outcome.position, Some(1));
    }

    #[test]
    fn test_seek_page_change_reaches_end_quietly() {
        let text = "$enddefinitions $end\n#0\n#1\n#2\n";
        let mut engine = loaded_engine(text);

        let outcome = engine.seek_page_change();
        assert_eq!(outcome.boundary, StepBoundary::EndOfTrace);
        assert!(outcome.diff.is_empty());
        assert_eq!(outcome.steps_taken, 3);
    }

    #[test]
    fn test_seek_with_no_trace() {
        let mut engine = SteppingEngine::new();
        let outcome = engine.seek_page_change();
        assert_eq!(outcome.boundary, StepBoundary::NoTrace);
    }

    #[test]
    fn test_breakpoint_add_remove_idempotent() {
        let mut engine = SteppingEngine::new();
        assert!(engine.add_page_breakpoint("p"));
        assert!(!engine.add_page_breakpoint("p"));
        assert!(engine.remove_page_breakpoint("p"));
        assert!(!engine.remove_page_breakpoint("p"));
        assert!(engine.breakpoints().is_empty());
    }

    #[test]
    fn test_breakpoints_listed_in_order() {
        let mut engine = SteppingEngine::new();
        engine.add_page_breakpoint("zeta");
        engine.add_page_breakpoint("alpha");
        assert_eq!(engine.breakpoints(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_load_resets_session_but_keeps_breakpoints() {
        let mut engine = loaded_engine(SAMPLE);
        engine.add_page_breakpoint("_0");
        engine.step(2);
        assert!(engine.state().is_started());

        engine.load(parse_str(SAMPLE).trace);
        assert!(!engine.state().is_started());
        assert!(engine.state().current_values.is_empty());
        assert_eq!(engine.breakpoints(), vec!["_0"]);

        // Breakpoints still fire against the reloaded trace.
        let outcome = engine.step(10);
        assert!(outcome.halted_on_breakpoint);
    }

    #[test]
    fn test_prefix_filter_limits_pages() {
        let text = "$var wire 1 ! clk $end\n\
                    $var wire 1 \" page_0 $end\n\
                    $enddefinitions $end\n\
                    #0\n\
                    1!\n\
                    1\"\n";
        let mut engine =
            SteppingEngine::new().with_filter(PageFilter::prefix("page_"));
        engine.load(parse_str(text).trace);

        engine.step(1);
        assert!(engine.state().active_pages.contains("page_0"));
        assert!(!engine.state().active_pages.contains("clk"));
        // clk's value is tracked even though it is not a page.
        assert!(engine.state().current_values.contains_key("clk"));
    }

    #[test]
    fn test_engines_are_independent() {
        let mut a = loaded_engine(SAMPLE);
        let mut b = loaded_engine(SAMPLE);

        a.step(2);
        b.step(1);
        assert_eq!(a.state().position, Some(1));
        assert_eq!(b.state().position, Some(0));
    }

    // Property-test scaffolding: random dumps over four page signals.

    const PROP_CODES: [char; 4] = ['!', '"', '%', '&'];

    fn prop_dump(events: &[(u64, usize, bool)]) -> String {
        let mut text = String::new();
        for (i, code) in PROP_CODES.iter().enumerate() {
            text.push_str(&format!("$var wire 1 {code} page_{i} $end\n"));
        }
        text.push_str("$enddefinitions $end\n");
        for (t, sig, bit) in events {
            text.push_str(&format!(
                "#{t}\n{}{}\n",
                u8::from(*bit),
                PROP_CODES[sig % PROP_CODES.len()]
            ));
        }
        text
    }

    fn prop_events() -> impl Strategy<Value = Vec<(u64, usize, bool)>> {
        proptest::collection::vec((0u64..40, 0usize..4, any::<bool>()), 0..60)
    }

    proptest::proptest! {
        #[test]
        fn prop_active_pages_never_drift(events in prop_events(), steps in 0usize..50) {
            let mut engine = loaded_engine(&prop_dump(&events));
            for _ in 0..steps {
                engine.step(1);
                prop_assert_eq!(
                    &engine.state().active_pages,
                    &engine.state().derived_active_pages(engine.filter())
                );
            }
        }

        #[test]
        fn prop_step_additivity(
            events in prop_events(),
            k in 0usize..20,
            m in 0usize..20
        ) {
            // No breakpoints registered, so the law applies unconditionally.
            let text = prop_dump(&events);
            let mut split = loaded_engine(&text);
            let mut joined = loaded_engine(&text);

            split.step(k);
            split.step(m);
            joined.step(k + m);

            prop_assert_eq!(split.state().position, joined.state().position);
            prop_assert_eq!(&split.state().current_values, &joined.state().current_values);
            prop_assert_eq!(&split.state().active_pages, &joined.state().active_pages);
        }

        #[test]
        fn prop_step_diff_matches_snapshots(events in prop_events(), k in 1usize..20) {
            let mut engine = loaded_engine(&prop_dump(&events));
            let before = engine.state().active_pages.clone();
            let outcome = engine.step(k);
            let expected = PageDiff::between(&before, &engine.state().active_pages);
            prop_assert_eq!(outcome.diff, expected);
        }
    }
}
