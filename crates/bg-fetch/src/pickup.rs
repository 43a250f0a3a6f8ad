//! Pickup shortlist entries.

use std::cmp::Ordering;

use bg_core::{CandidateId, CategoryId, Cell, Priority, TagSet};

/// One reachable candidate for one agent, with the cost of getting there.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pickup {
    pub candidate: CandidateId,
    pub category:  CategoryId,
    pub tags:      TagSet,
    pub priority:  Priority,
    pub cell:      Cell,
    pub cost:      u32,
}

/// Shortlist order: priority desc, then cost asc, then category asc.
///
/// Used with a stable sort, so remaining ties keep shard order.
pub fn pickup_order(a: &Pickup, b: &Pickup) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then(a.cost.cmp(&b.cost))
        .then(a.category.cmp(&b.category))
}

/// `true` if `pickups` is in [`pickup_order`].
pub fn is_shortlist_sorted(pickups: &[Pickup]) -> bool {
    pickups.windows(2).all(|w| pickup_order(&w[0], &w[1]) != Ordering::Greater)
}
