//! Refault-aware dampening of the reclaim proposal.
//!
//! Compares two consecutive `memory.stat` snapshots:
//!   - accuracy   = 1 - refault / steal  (how much of what we took stayed out)
//!   - efficiency = steal / scan         (how much scanning paid off)
//!
//! When either falls below its target the proposal is scaled by the
//! measured accuracy. With no scan and no steal since the last tick there
//! is nothing to measure, so the proposal is scaled by the accuracy target.
//
//  Pure: no async, no IO. Snapshot bookkeeping lives in `state`.

use cgroup::CounterSnapshot;

use crate::estimator::ratio_or_zero;

/// Counter growth between two snapshots. A counter that went backwards
/// (cgroup recreated) contributes zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterDelta {
    pub scan: u64,
    pub steal: u64,
    pub refault: u64,
}

impl CounterDelta {
    pub fn between(prev: &CounterSnapshot, curr: &CounterSnapshot) -> Self {
        let refault = curr
            .refault_anon
            .saturating_sub(prev.refault_anon)
            .saturating_add(curr.refault_file.saturating_sub(prev.refault_file));

        Self {
            scan: curr.pgscan.saturating_sub(prev.pgscan),
            steal: curr.pgsteal.saturating_sub(prev.pgsteal),
            refault,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.scan == 0 && self.steal == 0
    }
}

/// What the deltas said about recent reclaim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReclaimSignal {
    /// No scan and no steal since the previous snapshot.
    Degenerate,

    /// Ratios computed from the deltas. In the mixed case (exactly one of
    /// scan/steal is zero) a ratio whose denominator is zero counts as 0.
    Measured { accuracy: f64, efficiency: f64 },
}

/// Full result of one dampening step, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dampening {
    pub size: u64,
    pub delta: CounterDelta,
    pub signal: ReclaimSignal,
}

pub fn evaluate(
    proposal: u64,
    prev: &CounterSnapshot,
    curr: &CounterSnapshot,
    accuracy_target: f64,
    efficiency_target: f64,
) -> Dampening {
    let delta = CounterDelta::between(prev, curr);

    if delta.is_idle() {
        return Dampening {
            size: scale(proposal, accuracy_target),
            delta,
            signal: ReclaimSignal::Degenerate,
        };
    }

    let steal = delta.steal as f64;
    let accuracy = 1.0 - ratio_or_zero(delta.refault as f64, steal);
    let efficiency = ratio_or_zero(steal, delta.scan as f64);

    let size = if accuracy < accuracy_target || efficiency < efficiency_target {
        scale(proposal, accuracy)
    } else {
        proposal
    };

    Dampening {
        size,
        delta,
        signal: ReclaimSignal::Measured {
            accuracy,
            efficiency,
        },
    }
}

/// Dampened reclaim size; always within `0..=proposal`.
pub fn dampen(
    proposal: u64,
    prev: &CounterSnapshot,
    curr: &CounterSnapshot,
    accuracy_target: f64,
    efficiency_target: f64,
) -> u64 {
    evaluate(proposal, prev, curr, accuracy_target, efficiency_target).size
}

fn scale(proposal: u64, factor: f64) -> u64 {
    let scaled = (proposal as f64 * factor).max(0.0) as u64;
    scaled.min(proposal)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1 << 20;

    fn snap(pgscan: u64, pgsteal: u64, refault: u64) -> CounterSnapshot {
        CounterSnapshot {
            pgscan,
            pgsteal,
            refault_file: refault,
            ..Default::default()
        }
    }

    #[test]
    fn healthy_reclaim_keeps_proposal() {
        let prev = snap(1000, 900, 50);
        let curr = snap(1200, 1080, 60);

        let out = evaluate(10 * MIB, &prev, &curr, 0.5, 0.1);

        assert_eq!(out.size, 10 * MIB);
        assert_eq!(
            out.delta,
            CounterDelta {
                scan: 200,
                steal: 180,
                refault: 10
            }
        );
        let ReclaimSignal::Measured {
            accuracy,
            efficiency,
        } = out.signal
        else {
            panic!("expected a measured signal, got {:?}", out.signal);
        };
        assert!((accuracy - (1.0 - 10.0 / 180.0)).abs() < 1e-12);
        assert!((accuracy - 0.944).abs() < 1e-3);
        assert!((efficiency - 0.9).abs() < 1e-12);
    }

    #[test]
    fn low_accuracy_scales_by_accuracy() {
        // steal 100, refault 60 -> accuracy 0.4 < 0.5
        let prev = snap(0, 0, 0);
        let curr = snap(100, 100, 60);

        let out = dampen(10_000, &prev, &curr, 0.5, 0.1);
        assert_eq!(out, 4_000);
    }

    #[test]
    fn low_efficiency_scales_by_accuracy() {
        // scan 1000, steal 50 -> efficiency 0.05 < 0.1; accuracy 0.9
        let prev = snap(0, 0, 0);
        let curr = snap(1000, 50, 5);

        let out = dampen(10_000, &prev, &curr, 0.5, 0.1);
        assert_eq!(out, 9_000);
    }

    #[test]
    fn refaults_exceeding_steal_floor_at_zero() {
        let prev = snap(0, 0, 0);
        let curr = snap(100, 100, 250);

        assert_eq!(dampen(10 * MIB, &prev, &curr, 0.5, 0.1), 0);
    }

    #[test]
    fn no_activity_falls_back_to_accuracy_target() {
        let s = snap(500, 400, 30);

        let out = evaluate(8 * MIB, &s, &s, 0.9, 0.1);

        assert_eq!(out.signal, ReclaimSignal::Degenerate);
        // 8 MiB * 0.9 = 7549747.2
        assert_eq!(out.size, 7_549_747);
    }

    #[test]
    fn no_activity_ignores_refault_growth() {
        let prev = snap(500, 400, 30);
        let curr = snap(500, 400, 9_999);

        assert_eq!(dampen(1_000, &prev, &curr, 0.5, 0.1), 500);
    }

    #[test]
    fn mixed_scan_without_steal_keeps_full_accuracy() {
        // steal 0: refault/steal counts as 0 -> accuracy 1.0; efficiency 0 < target
        let prev = snap(0, 0, 0);
        let curr = snap(300, 0, 40);

        let out = evaluate(10_000, &prev, &curr, 0.5, 0.1);

        assert_eq!(
            out.signal,
            ReclaimSignal::Measured {
                accuracy: 1.0,
                efficiency: 0.0
            }
        );
        assert_eq!(out.size, 10_000);
    }

    #[test]
    fn mixed_steal_without_scan_scales_by_accuracy() {
        // scan 0: steal/scan counts as 0 -> efficiency 0 < target; accuracy 0.75
        let prev = snap(0, 0, 0);
        let curr = snap(0, 40, 10);

        let out = evaluate(10_000, &prev, &curr, 0.5, 0.1);

        assert_eq!(
            out.signal,
            ReclaimSignal::Measured {
                accuracy: 0.75,
                efficiency: 0.0
            }
        );
        assert_eq!(out.size, 7_500);
    }

    #[test]
    fn counter_reset_yields_zero_deltas() {
        let prev = snap(10_000, 9_000, 500);
        let curr = snap(10, 9, 1);

        let out = evaluate(1_000, &prev, &curr, 0.5, 0.1);

        assert_eq!(out.delta, CounterDelta::default());
        assert_eq!(out.signal, ReclaimSignal::Degenerate);
        assert_eq!(out.size, 500);
    }

    #[test]
    fn anon_and_file_refaults_are_summed() {
        let prev = CounterSnapshot::default();
        let curr = CounterSnapshot {
            pgscan: 100,
            pgsteal: 100,
            refault_anon: 30,
            refault_file: 20,
            ..Default::default()
        };

        assert_eq!(CounterDelta::between(&prev, &curr).refault, 50);
    }

    #[test]
    fn zero_proposal_stays_zero() {
        let prev = snap(0, 0, 0);
        let curr = snap(100, 10, 90);
        assert_eq!(dampen(0, &prev, &curr, 0.5, 0.1), 0);
        assert_eq!(dampen(0, &prev, &prev, 0.5, 0.1), 0);
    }
}
