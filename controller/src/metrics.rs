use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
///
/// Clones share the same cells, so the binary can keep a handle and log a
/// summary after the loop has been consumed.
#[derive(Clone, Default, Debug)]
pub struct Counters {
    pub ticks: Arc<AtomicU64>,

    // tick outcomes
    pub below_min_size: Arc<AtomicU64>,
    pub saturated: Arc<AtomicU64>,
    pub suppressed: Arc<AtomicU64>,

    pub reclaim_requests: Arc<AtomicU64>,
    pub reclaimed_bytes: Arc<AtomicU64>,
    pub reclaim_failures: Arc<AtomicU64>,

    pub counter_read_failures: Arc<AtomicU64>,
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub ticks: u64,
    pub below_min_size: u64,
    pub saturated: u64,
    pub suppressed: u64,
    pub reclaim_requests: u64,
    pub reclaimed_bytes: u64,
    pub reclaim_failures: u64,
    pub counter_read_failures: u64,
}

impl Counters {
    pub fn snapshot(&self) -> CountersSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CountersSnapshot {
            ticks: load(&self.ticks),
            below_min_size: load(&self.below_min_size),
            saturated: load(&self.saturated),
            suppressed: load(&self.suppressed),
            reclaim_requests: load(&self.reclaim_requests),
            reclaimed_bytes: load(&self.reclaimed_bytes),
            reclaim_failures: load(&self.reclaim_failures),
            counter_read_failures: load(&self.counter_read_failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cells() {
        let a = Counters::default();
        let b = a.clone();

        a.ticks.fetch_add(1, Ordering::Relaxed);
        b.reclaimed_bytes.fetch_add(4096, Ordering::Relaxed);

        let snap = a.snapshot();
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.reclaimed_bytes, 4096);
        assert_eq!(b.snapshot(), snap);
    }
}
