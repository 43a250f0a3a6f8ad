//! Refresh stage: bring each candidate's offset cache in line with its cell.
//!
//! Runs one shard per work item.  Writes are candidate-private; anything that
//! touches shared structures is pushed to the [`DeferredQueue`].

use std::ops::AddAssign;

use bg_core::GridBounds;

use crate::{CategoryShard, DeferredQueue, DeferredUpdate, Refresh};

/// Per-shard refresh counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub unchanged:   usize,
    pub initialized: usize,
    pub moved:       usize,
}

impl RefreshStats {
    /// Number of cache writes performed.
    pub fn writes(&self) -> usize {
        self.initialized + self.moved
    }
}

impl AddAssign for RefreshStats {
    fn add_assign(&mut self, rhs: Self) {
        self.unchanged   += rhs.unchanged;
        self.initialized += rhs.initialized;
        self.moved       += rhs.moved;
    }
}

pub fn refresh_shard(
    shard:    &CategoryShard,
    bounds:   GridBounds,
    deferred: &DeferredQueue,
) -> RefreshStats {
    let mut stats = RefreshStats::default();
    for candidate in &shard.candidates {
        match candidate.offsets.refresh(candidate.cell, &candidate.shape, bounds) {
            Refresh::Unchanged => stats.unchanged += 1,
            Refresh::Initialized => {
                stats.initialized += 1;
                deferred.push(DeferredUpdate::Relocate { candidate: candidate.id, to: candidate.cell });
            }
            Refresh::Moved { .. } => {
                stats.moved += 1;
                deferred.push(DeferredUpdate::Relocate { candidate: candidate.id, to: candidate.cell });
            }
        }
    }
    stats
}
