//! First-pass reclaim proposal from usage and pressure.
//
//  Pure: no async, no IO.

/// `a / b`, or `0.0` when `b` is zero.
pub(crate) fn ratio_or_zero(a: f64, b: f64) -> f64 {
    if b != 0.0 { a / b } else { 0.0 }
}

/// Propose how many bytes to reclaim this tick.
///
/// `headroom = max(0, 1 - psi_some / threshold)` scales
/// `ratio * current_mem`; the product is truncated toward zero.
///
/// Returns `0` whenever `psi_some >= threshold`, including the
/// degenerate `threshold == 0` configuration.
pub fn estimate(current_mem: u64, psi_some: f64, threshold: f64, ratio: f64) -> u64 {
    if psi_some >= threshold {
        return 0;
    }

    let headroom = (1.0 - ratio_or_zero(psi_some, threshold)).max(0.0);
    let proposal = headroom * ratio * current_mem as f64;

    proposal.max(0.0) as u64
}
