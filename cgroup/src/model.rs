//! Values read out of the cgroup pseudo-files.

/// Cumulative reclaim counters from `memory.stat`.
///
/// Every field only grows while the cgroup lives. Consumers compute
/// deltas between two snapshots and must saturate at zero, since the
/// counters restart when the cgroup is recreated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Pages scanned by reclaim.
    pub pgscan: u64,

    /// Pages actually reclaimed.
    pub pgsteal: u64,

    /// Anonymous pages re-activated after being reclaimed
    /// (`workingset_activate_anon`).
    pub refault_anon: u64,

    /// File pages re-activated after being reclaimed
    /// (`workingset_activate_file`).
    pub refault_file: u64,

    /// Swap-in/swap-out; logged only, never used in decisions.
    pub pswpin: u64,
    pub pswpout: u64,
}

/// The `some` line of `memory.pressure`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PressureStats {
    pub avg10: f64,
    pub avg60: f64,
    pub avg300: f64,
    /// Total stall time in microseconds.
    pub total: u64,
}
