//! Finalize stage: pair errands with shortlist entries.
//!
//! Runs serially, once per agent, after every compile item has finished.

use bg_world::{DeferredQueue, DeferredUpdate, OffsetTable};

use crate::fetch::fetch_order;
use crate::{Fetch, FetchWorkItem, StageContext};

/// Build `item.fetches` from the errand board and `item.pickups`.
///
/// Errand destination caches are never written here: a missing or stale one
/// is replaced by a transient table and queued for the orchestrator.
pub fn finalize_fetches(item: &mut FetchWorkItem, ctx: &StageContext<'_>, deferred: &DeferredQueue) {
    item.fetches.clear();
    let Some(agent) = item.agent.as_ref() else {
        return;
    };

    for errand in ctx.errands.iter() {
        if !errand.claimable_by(agent.id) {
            continue;
        }
        let Some(pickup) = item
            .pickups
            .iter()
            .find(|p| p.category == errand.category && p.tags.satisfies(errand.tags))
        else {
            continue;
        };

        let cost = match errand.offsets.fresh_for(errand.destination) {
            Some(table) => ctx.oracle.cost(&agent.nav, errand.destination, &table),
            None => {
                deferred.push(DeferredUpdate::RefreshDestination(errand.id));
                let table = OffsetTable::compute(errand.destination, &errand.shape, ctx.bounds);
                ctx.oracle.cost(&agent.nav, errand.destination, &table)
            }
        };
        let Some(cost) = cost.filter(|&c| ctx.within_bound(c)) else {
            continue;
        };

        item.fetches.push(Fetch {
            errand:      errand.id,
            category:    errand.category,
            priority:    errand.priority,
            destination: errand.destination,
            cost,
            pickup:      pickup.candidate,
        });
    }
    item.fetches.sort_by(fetch_order);
}
