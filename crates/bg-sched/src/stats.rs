//! Running counters across cycles.

use bg_world::{DrainStats, RefreshStats};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles:           u64,
    pub committed:        u64,
    pub timed_out:        u64,
    pub aborted:          u64,
    pub skipped:          u64,
    pub inline:           u64,
    /// Offset tables compile items had to compute themselves.
    pub inline_offsets:   u64,
    /// Deferred updates applied by post-barrier drains.
    pub deferred_drained: u64,
    /// Jobs abandoned at a timeout that have not finished yet.
    pub stragglers:       usize,
    pub last_refresh:     RefreshStats,
    pub last_drain:       DrainStats,
}
