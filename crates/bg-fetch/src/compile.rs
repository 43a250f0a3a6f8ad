//! Compile stage: one agent's sorted pickup shortlist.
//!
//! Runs on a worker thread, one agent per work item.  Reads the shared
//! candidate index; the only writes are per-candidate offset fallbacks.

use crate::pickup::pickup_order;
use crate::{FetchWorkItem, Pickup, StageContext};

/// Build `item.pickups` for the item's agent.
///
/// Candidates are kept when all of these hold, checked in order:
///
/// | Check          | Rule                                                  |
/// |----------------|-------------------------------------------------------|
/// | claim          | unclaimed, or claimed by this agent                   |
/// | automation     | not excluded, unless the agent is not automated       |
/// | tags           | candidate tags satisfy the agent's interests          |
/// | cost           | oracle returns `Some`, within `max_cost`              |
///
/// A missing or stale offset table is computed inline and stored.
pub fn compile_pickups(item: &mut FetchWorkItem, ctx: &StageContext<'_>) {
    let Some(agent) = item.agent.as_ref() else {
        return;
    };
    let shards = ctx.candidates.shards();
    if item.shards.len() < shards.len() {
        item.shards.resize_with(shards.len(), Vec::new);
    }

    let mut inline = 0;
    for (scratch, shard) in item.shards.iter_mut().zip(shards) {
        scratch.clear();
        for candidate in &shard.candidates {
            if !candidate.claimable_by(agent.id)
                || (agent.automated && candidate.automation_excluded)
                || !candidate.tags.satisfies(agent.interests)
            {
                continue;
            }
            let (table, computed) =
                candidate.offsets.get_or_compute(candidate.cell, &candidate.shape, ctx.bounds);
            if computed {
                inline += 1;
            }
            let Some(cost) = ctx.oracle.cost(&agent.nav, candidate.cell, &table) else {
                continue;
            };
            if !ctx.within_bound(cost) {
                continue;
            }
            scratch.push(Pickup {
                candidate: candidate.id,
                category:  candidate.category,
                tags:      candidate.tags,
                priority:  candidate.priority,
                cell:      candidate.cell,
                cost,
            });
        }
    }

    item.pickups.clear();
    for scratch in &item.shards {
        item.pickups.extend_from_slice(scratch);
    }
    item.pickups.sort_by(pickup_order);
    item.inline_offsets += inline;
}
