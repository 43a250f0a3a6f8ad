//! Deferred orchestrator-only updates.
//!
//! Workers may not touch the spatial partition or errand caches, so they push
//! a [`DeferredUpdate`] here instead.  The queue is multi-producer but has a
//! single consumer: the orchestrating thread, which drains it once per cycle
//! after the barrier via [`apply_deferred`].

use crossbeam_queue::SegQueue;

use bg_core::{CandidateId, Cell, ErrandId};
use bg_jobs::on_worker_thread;

use crate::{SpatialPartition, World};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeferredUpdate {
    /// A candidate's offset table was (re)computed for `to`; re-file it in
    /// the partition.
    Relocate { candidate: CandidateId, to: Cell },
    /// An errand's destination offsets were missing or stale at read time.
    RefreshDestination(ErrandId),
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    queue: SegQueue<DeferredUpdate>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, update: DeferredUpdate) {
        self.queue.push(update);
    }

    pub fn pop(&self) -> Option<DeferredUpdate> {
        self.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// What one drain did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub relocated: usize,
    /// Relocations for candidates that have since left the index.
    pub removed:   usize,
    pub refreshed: usize,
    /// Updates that turned out to be no-ops.
    pub ignored:   usize,
}

impl DrainStats {
    pub fn total(&self) -> usize {
        self.relocated + self.removed + self.refreshed + self.ignored
    }
}

/// Apply every queued update.  Orchestrating thread only.
///
/// Relocations use the candidate's *current* cell rather than the queued
/// one, so a candidate that moved again since the enqueue lands where it
/// actually is.
pub fn apply_deferred(
    world:     &World,
    partition: &mut SpatialPartition,
    queue:     &DeferredQueue,
) -> DrainStats {
    debug_assert!(!on_worker_thread(), "deferred queue drained from a work item");
    let mut stats = DrainStats::default();

    while let Some(update) = queue.pop() {
        match update {
            DeferredUpdate::Relocate { candidate, .. } => {
                match world.candidates().and_then(|index| index.get(candidate)) {
                    Some(c) => {
                        if partition.relocate(candidate, c.cell) {
                            stats.relocated += 1;
                        } else {
                            stats.ignored += 1;
                        }
                    }
                    None => {
                        if partition.remove(candidate).is_some() {
                            stats.removed += 1;
                        } else {
                            stats.ignored += 1;
                        }
                    }
                }
            }
            DeferredUpdate::RefreshDestination(id) => match world.errands().get(id) {
                Some(errand) => {
                    errand.offsets.refresh(errand.destination, &errand.shape, world.bounds());
                    stats.refreshed += 1;
                }
                None => stats.ignored += 1,
            },
        }
    }
    stats
}
