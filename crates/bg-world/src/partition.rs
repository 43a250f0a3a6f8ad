//! Spatial partition over candidate locations.
//!
//! An R-tree (via `rstar`) maps cells to the candidates standing on them.
//! The partition belongs to the orchestrating thread: workers record moves in
//! the [`DeferredQueue`](crate::DeferredQueue) and the orchestrator applies
//! them after the barrier.  Every mutator asserts it is not running inside a
//! work item.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use bg_core::{CandidateId, Cell};
use bg_jobs::on_worker_thread;

use crate::CandidateIndex;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
struct PartitionEntry {
    point: [i64; 2],
    id:    CandidateId,
}

impl PartitionEntry {
    fn new(cell: Cell, id: CandidateId) -> Self {
        Self { point: point(cell), id }
    }
}

/// Cells are widened so squared distances between any two `i32` cells fit.
fn point(cell: Cell) -> [i64; 2] {
    [i64::from(cell.x), i64::from(cell.y)]
}

impl RTreeObject for PartitionEntry {
    type Envelope = AABB<[i64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PartitionEntry {
    fn distance_2(&self, point: &[i64; 2]) -> i64 {
        let dx = self.point[0].saturating_sub(point[0]);
        let dy = self.point[1].saturating_sub(point[1]);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

// ── SpatialPartition ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SpatialPartition {
    tree:    RTree<PartitionEntry>,
    located: FxHashMap<CandidateId, Cell>,
}

impl SpatialPartition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every candidate at its current cell.
    pub fn bulk_load(index: &CandidateIndex) -> Self {
        let located: FxHashMap<CandidateId, Cell> =
            index.iter().map(|c| (c.id, c.cell)).collect();
        let entries = located
            .iter()
            .map(|(&id, &cell)| PartitionEntry::new(cell, id))
            .collect();
        Self { tree: RTree::bulk_load(entries), located }
    }

    pub fn insert(&mut self, id: CandidateId, cell: Cell) {
        debug_assert!(!on_worker_thread(), "partition mutated from a work item");
        if let Some(old) = self.located.insert(id, cell) {
            self.tree.remove(&PartitionEntry::new(old, id));
        }
        self.tree.insert(PartitionEntry::new(cell, id));
    }

    pub fn remove(&mut self, id: CandidateId) -> Option<Cell> {
        debug_assert!(!on_worker_thread(), "partition mutated from a work item");
        let cell = self.located.remove(&id)?;
        self.tree.remove(&PartitionEntry::new(cell, id));
        Some(cell)
    }

    /// Move `id` to `to`.  Returns `false` if it was already there.
    pub fn relocate(&mut self, id: CandidateId, to: Cell) -> bool {
        if self.located.get(&id) == Some(&to) {
            return false;
        }
        self.insert(id, to);
        true
    }

    /// Cell the partition currently files `id` under.
    pub fn cell_of(&self, id: CandidateId) -> Option<Cell> {
        self.located.get(&id).copied()
    }

    /// Candidates filed exactly at `cell`, in id order.
    pub fn at(&self, cell: Cell) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = self
            .tree
            .locate_all_at_point(&point(cell))
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Candidates within Euclidean `radius` of `cell`, in id order.
    pub fn within(&self, cell: Cell, radius: u32) -> Vec<CandidateId> {
        let r = i64::from(radius);
        let mut ids: Vec<CandidateId> = self
            .tree
            .locate_within_distance(point(cell), r.saturating_mul(r))
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Drop entries for candidates no longer in `index`.  Returns how many
    /// were removed.
    pub fn prune(&mut self, index: &CandidateIndex) -> usize {
        let gone: Vec<CandidateId> = self
            .located
            .keys()
            .copied()
            .filter(|id| !index.contains(*id))
            .collect();
        for &id in &gone {
            self.remove(id);
        }
        gone.len()
    }

    pub fn len(&self) -> usize {
        self.located.len()
    }

    pub fn is_empty(&self) -> bool {
        self.located.is_empty()
    }
}
