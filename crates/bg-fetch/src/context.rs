//! Read-only stage inputs shared by every compile and finalize call.

use bg_core::GridBounds;
use bg_world::{CandidateIndex, ErrandBoard, NavOracle, World};

/// A borrowed view of one cycle's world snapshot.
///
/// Built once per cycle and shared immutably by every work item.  Only
/// offset caches (interior, idempotent) are written through it.
#[derive(Copy, Clone)]
pub struct StageContext<'a> {
    pub candidates: &'a CandidateIndex,
    pub errands:    &'a ErrandBoard,
    pub oracle:     &'a dyn NavOracle,
    pub bounds:     GridBounds,
    /// Costs above this bound are treated as unreachable.
    pub max_cost:   Option<u32>,
}

impl<'a> StageContext<'a> {
    /// `None` when the world lacks a candidate index or an oracle.
    pub fn from_world(world: &'a World, max_cost: Option<u32>) -> Option<Self> {
        Some(Self {
            candidates: world.candidates()?,
            errands:    world.errands(),
            oracle:     world.oracle()?,
            bounds:     world.bounds(),
            max_cost,
        })
    }

    #[inline]
    pub fn within_bound(&self, cost: u32) -> bool {
        self.max_cost.is_none_or(|max| cost <= max)
    }
}
