//! Values produced by one controller tick.

use crate::damper::Dampening;

/// Everything the deciding phase computed, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub usage: u64,
    pub psi_some: f64,

    /// Estimator output.
    pub proposal: u64,

    /// Damper output together with the deltas it was based on.
    pub dampening: Dampening,

    /// Policy output: bytes to hand to the sink, `0` for none.
    pub request: u64,
}

/// How a tick ended. Fatal read failures are reported as errors instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Usage below `min_size`; pressure was not even sampled.
    BelowMinSize { usage: u64 },

    /// Pressure at or above the threshold; no reclaim.
    Saturated { usage: u64, psi_some: f64 },

    /// The policy reduced the request to zero.
    Suppressed(Decision),

    /// The sink accepted the request.
    Reclaimed(Decision),

    /// The sink rejected the request; logged and otherwise ignored.
    ReclaimFailed(Decision),
}

impl TickOutcome {
    /// Bytes handed to the sink this tick, whether or not it succeeded.
    pub fn requested_bytes(&self) -> Option<u64> {
        match self {
            TickOutcome::Reclaimed(d) | TickOutcome::ReclaimFailed(d) => Some(d.request),
            _ => None,
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            TickOutcome::Suppressed(d)
            | TickOutcome::Reclaimed(d)
            | TickOutcome::ReclaimFailed(d) => Some(d),
            _ => None,
        }
    }
}
