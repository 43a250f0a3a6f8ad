//! Fetch entries: an errand paired with the pickup that would satisfy it.

use std::cmp::Ordering;

use bg_core::{CandidateId, CategoryId, Cell, ErrandId, Priority};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fetch {
    pub errand:      ErrandId,
    pub category:    CategoryId,
    pub priority:    Priority,
    pub destination: Cell,
    /// Cost for the agent to reach the errand destination.
    pub cost:        u32,
    /// Best shortlist entry satisfying the errand.
    pub pickup:      CandidateId,
}

/// Priority desc, cost asc, errand id asc.
pub fn fetch_order(a: &Fetch, b: &Fetch) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then(a.cost.cmp(&b.cost))
        .then(a.errand.cmp(&b.errand))
}
