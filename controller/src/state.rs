//! Running state owned by one `ControlLoop`.

use cgroup::CounterSnapshot;
use tracing::trace;

/// Where the loop is inside a tick.
///
/// A tick that finds usage below `min_size` parks in `Idle` instead of
/// going through `Deciding`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    #[default]
    Sampling,
    Deciding,
    Executing,
    Sleeping,
    Stopped,
}

/// Previous counter snapshot plus loop bookkeeping.
///
/// Starts from the all-zero snapshot, unprimed. The first snapshot handed
/// to [`ControllerState::advance`] becomes its own predecessor, so the first
/// dampening sees zero deltas instead of "everything since boot".
#[derive(Debug, Default)]
pub struct ControllerState {
    prev: CounterSnapshot,
    primed: bool,
    phase: Phase,
    ticks: u64,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> &CounterSnapshot {
        &self.prev
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of ticks started so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Store `curr` as the new previous snapshot and return the one it
    /// replaces.
    pub fn advance(&mut self, curr: CounterSnapshot) -> CounterSnapshot {
        let prev = if self.primed { self.prev } else { curr };
        self.prev = curr;
        self.primed = true;
        prev
    }

    pub(crate) fn begin_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.enter(Phase::Sampling);
        self.ticks
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            trace!(from = ?self.phase, to = ?phase, "phase transition");
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(pgscan: u64) -> CounterSnapshot {
        CounterSnapshot {
            pgscan,
            ..Default::default()
        }
    }

    #[test]
    fn starts_zeroed_and_sampling() {
        let state = ControllerState::new();
        assert_eq!(*state.previous(), CounterSnapshot::default());
        assert!(!state.is_primed());
        assert_eq!(state.phase(), Phase::Sampling);
        assert_eq!(state.ticks(), 0);
    }

    #[test]
    fn first_advance_is_its_own_baseline() {
        let mut state = ControllerState::new();

        let prev = state.advance(snap(1_000));

        assert_eq!(prev, snap(1_000));
        assert!(state.is_primed());
    }

    #[test]
    fn later_advances_return_the_replaced_snapshot() {
        let mut state = ControllerState::new();
        state.advance(snap(1_000));

        assert_eq!(state.advance(snap(1_200)), snap(1_000));
        assert_eq!(state.advance(snap(1_500)), snap(1_200));
        assert_eq!(*state.previous(), snap(1_500));
    }

    #[test]
    fn begin_tick_counts_and_resets_phase() {
        let mut state = ControllerState::new();
        state.enter(Phase::Idle);

        assert_eq!(state.begin_tick(), 1);
        assert_eq!(state.phase(), Phase::Sampling);

        state.enter(Phase::Sleeping);
        assert_eq!(state.begin_tick(), 2);
        assert_eq!(state.phase(), Phase::Sampling);
    }
}
