//! Unit tests for bg-fetch.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use bg_core::{AgentId, CandidateId, CategoryId, Cell, ErrandId, GridBounds, Priority, TagSet};
use bg_world::{
    Candidate, CandidateIndex, Errand, ErrandBoard, NavOracle, NavState, OffsetShape, OffsetTable,
    World,
};

use crate::{Agent, FetchWorkItem, StageContext, compile_pickups, finalize_fetches};

// ── Helpers ───────────────────────────────────────────────────────────────────

const BOUNDS: GridBounds = GridBounds::new(64, 64);

/// Costs looked up by the target's own cell; `-1` (or absent) is unreachable.
struct TableOracle(FxHashMap<Cell, i32>);

impl NavOracle for TableOracle {
    fn cost(&self, _from: &NavState, destination: Cell, _offsets: &OffsetTable) -> Option<u32> {
        self.0.get(&destination).and_then(|&c| u32::try_from(c).ok())
    }
}

fn oracle(costs: &[(Cell, i32)]) -> Arc<dyn NavOracle> {
    Arc::new(TableOracle(costs.iter().copied().collect()))
}

/// Five category-0 candidates on row 0 with the given costs and priorities.
fn scenario_world(costs: [i32; 5], prios: [i32; 5]) -> World {
    let mut index = CandidateIndex::new();
    let mut table = Vec::new();
    for i in 0..5 {
        let cell = Cell::new(i as i32 * 2, 0);
        index
            .insert(
                Candidate::new(CandidateId(i), CategoryId(0), cell)
                    .with_priority(Priority(prios[i as usize]))
                    .with_shape(OffsetShape::single()),
            )
            .unwrap();
        table.push((cell, costs[i as usize]));
    }
    World::new(BOUNDS).with_candidates(index).with_oracle(oracle(&table))
}

fn compiled(world: &World, agent: Agent) -> FetchWorkItem {
    let ctx = StageContext::from_world(world, None).unwrap();
    let mut item = FetchWorkItem::for_agent(agent);
    compile_pickups(&mut item, &ctx);
    item
}

fn ids(item: &FetchWorkItem) -> Vec<u32> {
    item.pickups.iter().map(|p| p.candidate.0).collect()
}

// ── Compile ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod compile_tests {
    use super::*;

    #[test]
    fn priority_then_cost_and_unreachable_dropped() {
        let world = scenario_world([10, 5, 20, -1, 7], [1, 1, 2, 1, 1]);
        for a in 0..3 {
            let item  = compiled(&world, Agent::new(AgentId(a), Cell::new(0, 5)));
            let costs: Vec<u32> = item.pickups.iter().map(|p| p.cost).collect();
            assert_eq!(costs, vec![20, 5, 7, 10]);
            assert!(!item.pickups.iter().any(|p| p.candidate == CandidateId(3)));
        }
    }

    #[test]
    fn claimed_by_other_agent_is_skipped() {
        let mut world = scenario_world([1, 2, 3, 4, 5], [0; 5]);
        world.candidates_mut().unwrap().set_claim(CandidateId(0), Some(AgentId(9))).unwrap();
        world.candidates_mut().unwrap().set_claim(CandidateId(1), Some(AgentId(1))).unwrap();
        let item = compiled(&world, Agent::new(AgentId(1), Cell::new(0, 0)));
        assert_eq!(ids(&item), vec![1, 2, 3, 4]);
    }

    #[test]
    fn automated_agents_skip_excluded_candidates() {
        let mut index = CandidateIndex::new();
        index.insert(Candidate::new(CandidateId(0), CategoryId(0), Cell::new(1, 1)).excluded_from_automation()).unwrap();
        index.insert(Candidate::new(CandidateId(1), CategoryId(0), Cell::new(2, 2))).unwrap();
        let world = World::new(BOUNDS)
            .with_candidates(index)
            .with_oracle(oracle(&[(Cell::new(1, 1), 1), (Cell::new(2, 2), 2)]));

        let robot = compiled(&world, Agent::new(AgentId(0), Cell::new(0, 0)).automated());
        assert_eq!(ids(&robot), vec![1]);
        let person = compiled(&world, Agent::new(AgentId(1), Cell::new(0, 0)));
        assert_eq!(ids(&person), vec![0, 1]);
    }

    #[test]
    fn interests_filter_by_tag() {
        let mut index = CandidateIndex::new();
        index.insert(Candidate::new(CandidateId(0), CategoryId(0), Cell::new(1, 1)).with_tags(TagSet::single(3))).unwrap();
        index.insert(Candidate::new(CandidateId(1), CategoryId(1), Cell::new(2, 2)).with_tags(TagSet::single(4))).unwrap();
        let world = World::new(BOUNDS)
            .with_candidates(index)
            .with_oracle(oracle(&[(Cell::new(1, 1), 1), (Cell::new(2, 2), 1)]));

        let picky = compiled(&world, Agent::new(AgentId(0), Cell::new(0, 0)).with_interests(TagSet::single(4)));
        assert_eq!(ids(&picky), vec![1]);
        let any = compiled(&world, Agent::new(AgentId(1), Cell::new(0, 0)));
        assert_eq!(ids(&any), vec![0, 1]);
    }

    #[test]
    fn max_cost_bounds_shortlist() {
        let world = scenario_world([10, 5, 20, -1, 7], [0; 5]);
        let ctx   = StageContext::from_world(&world, Some(7)).unwrap();
        let mut item = FetchWorkItem::for_agent(Agent::new(AgentId(0), Cell::new(0, 0)));
        compile_pickups(&mut item, &ctx);
        assert_eq!(ids(&item), vec![1, 4]);
    }

    #[test]
    fn null_offsets_are_filled_inline() {
        let world = scenario_world([10, 5, 20, -1, 7], [1; 5]);
        let index = world.candidates().unwrap();
        assert!(index.iter().all(|c| c.offsets.current().is_none()));

        let item = compiled(&world, Agent::new(AgentId(0), Cell::new(0, 0)));
        assert_eq!(item.inline_offsets, 5, "the unreachable candidate still gets a table");
        assert!(index.iter().all(|c| c.offsets.fresh_for(c.cell).is_some()));
        assert_eq!(item.pickups[0].cost, 5);

        let again = compiled(&world, Agent::new(AgentId(1), Cell::new(0, 0)));
        assert_eq!(again.inline_offsets, 0);
    }

    #[test]
    fn categories_break_cost_ties() {
        let mut index = CandidateIndex::new();
        index.insert(Candidate::new(CandidateId(0), CategoryId(5), Cell::new(1, 1))).unwrap();
        index.insert(Candidate::new(CandidateId(1), CategoryId(2), Cell::new(2, 2))).unwrap();
        let world = World::new(BOUNDS)
            .with_candidates(index)
            .with_oracle(oracle(&[(Cell::new(1, 1), 3), (Cell::new(2, 2), 3)]));
        let item = compiled(&world, Agent::new(AgentId(0), Cell::new(0, 0)));
        assert_eq!(ids(&item), vec![1, 0]);
    }

    #[test]
    fn missing_oracle_has_no_context() {
        let world = World::new(BOUNDS).with_candidates(CandidateIndex::new());
        assert!(StageContext::from_world(&world, None).is_none());
    }
}

// ── Finalize ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod finalize_tests {
    use bg_world::{DeferredQueue, DeferredUpdate};

    use super::*;

    fn errand_world() -> World {
        let mut index = CandidateIndex::new();
        index.insert(Candidate::new(CandidateId(0), CategoryId(0), Cell::new(1, 0)).with_tags(TagSet::single(1))).unwrap();
        index.insert(Candidate::new(CandidateId(1), CategoryId(0), Cell::new(2, 0)).with_tags(TagSet::single(2))).unwrap();
        index.insert(Candidate::new(CandidateId(2), CategoryId(1), Cell::new(3, 0))).unwrap();

        let board = ErrandBoard::from_errands([
            Errand::new(ErrandId(0), CategoryId(0), Cell::new(10, 10)).with_priority(Priority(1)),
            Errand::new(ErrandId(1), CategoryId(0), Cell::new(11, 11)).with_tags(TagSet::single(2)).with_priority(Priority(3)),
            Errand::new(ErrandId(2), CategoryId(1), Cell::new(12, 12)).with_priority(Priority(1)),
            Errand::new(ErrandId(3), CategoryId(7), Cell::new(13, 13)),
        ])
        .unwrap();

        World::new(BOUNDS)
            .with_candidates(index)
            .with_errands(board)
            .with_oracle(oracle(&[
                (Cell::new(1, 0), 1),
                (Cell::new(2, 0), 2),
                (Cell::new(3, 0), 3),
                (Cell::new(10, 10), 8),
                (Cell::new(11, 11), 9),
                (Cell::new(12, 12), 4),
                (Cell::new(13, 13), 1),
            ]))
    }

    #[test]
    fn pairs_each_errand_with_best_matching_pickup() {
        let world    = errand_world();
        let ctx      = StageContext::from_world(&world, None).unwrap();
        let deferred = DeferredQueue::new();
        let mut item = FetchWorkItem::for_agent(Agent::new(AgentId(0), Cell::new(0, 0)));
        compile_pickups(&mut item, &ctx);
        finalize_fetches(&mut item, &ctx, &deferred);

        let got: Vec<(u32, u32, u32)> =
            item.fetches.iter().map(|f| (f.errand.0, f.pickup.0, f.cost)).collect();
        // Priority 3 first, then the two priority-1 errands by cost; errand 3
        // has no pickup of its category.
        assert_eq!(got, vec![(1, 1, 9), (2, 2, 4), (0, 0, 8)]);
    }

    #[test]
    fn stale_destinations_are_queued_not_written() {
        let world    = errand_world();
        let ctx      = StageContext::from_world(&world, None).unwrap();
        let deferred = DeferredQueue::new();
        let mut item = FetchWorkItem::for_agent(Agent::new(AgentId(0), Cell::new(0, 0)));
        compile_pickups(&mut item, &ctx);
        finalize_fetches(&mut item, &ctx, &deferred);

        assert_eq!(deferred.len(), 3);
        while let Some(update) = deferred.pop() {
            assert!(matches!(update, DeferredUpdate::RefreshDestination(_)));
        }
        assert!(world.errands().iter().all(|e| e.offsets.current().is_none()));
    }

    #[test]
    fn errands_claimed_by_others_are_skipped() {
        let mut world = errand_world();
        world.errands_mut().set_claim(ErrandId(1), Some(AgentId(5))).unwrap();
        let ctx      = StageContext::from_world(&world, None).unwrap();
        let deferred = DeferredQueue::new();
        let mut item = FetchWorkItem::for_agent(Agent::new(AgentId(0), Cell::new(0, 0)));
        compile_pickups(&mut item, &ctx);
        finalize_fetches(&mut item, &ctx, &deferred);
        assert!(item.fetches.iter().all(|f| f.errand != ErrandId(1)));
        assert_eq!(item.fetches.len(), 2);
    }
}

// ── Work items ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod work_item_tests {
    use bg_jobs::{ItemPool, Reusable};

    use super::*;

    #[test]
    fn cleanup_clears_but_keeps_capacity() {
        let world = scenario_world([1, 2, 3, 4, 5], [0; 5]);
        let mut item = compiled(&world, Agent::new(AgentId(0), Cell::new(0, 0)));
        let cap = item.pickups.capacity();
        item.cleanup();
        assert!(item.agent.is_none());
        assert!(item.pickups.is_empty());
        assert!(item.shards.iter().all(Vec::is_empty));
        assert_eq!(item.pickups.capacity(), cap);
    }

    #[test]
    fn pooled_items_are_reassigned() {
        let mut pool: ItemPool<FetchWorkItem> = ItemPool::new();
        let mut item = pool.take();
        item.assign(Agent::new(AgentId(3), Cell::new(0, 0)));
        pool.give_back(item);
        let mut again = pool.take();
        assert!(again.agent.is_none());
        again.assign(Agent::new(AgentId(4), Cell::new(0, 0)));
        assert_eq!(again.agent.map(|a| a.id), Some(AgentId(4)));
        assert_eq!(pool.created(), 1);
    }
}

// ── Randomized ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::is_shortlist_sorted;

    use super::*;

    #[test]
    fn shortlists_are_always_sorted() {
        let mut rng = SmallRng::seed_from_u64(0xB0A7);
        for _ in 0..20 {
            let mut index = CandidateIndex::new();
            let mut costs = Vec::new();
            for i in 0..rng.gen_range(0..60u32) {
                let cell = Cell::new(rng.gen_range(0..64), rng.gen_range(0..64));
                let _ = index.insert(
                    Candidate::new(CandidateId(i), CategoryId(rng.gen_range(0..4)), cell)
                        .with_priority(Priority(rng.gen_range(0..3))),
                );
                costs.push((cell, rng.gen_range(-1..30)));
            }
            let world = World::new(BOUNDS).with_candidates(index).with_oracle(oracle(&costs));
            for a in 0..rng.gen_range(0..5u32) {
                let item = compiled(&world, Agent::new(AgentId(a), Cell::new(0, 0)));
                assert!(is_shortlist_sorted(&item.pickups));
            }
        }
    }
}
