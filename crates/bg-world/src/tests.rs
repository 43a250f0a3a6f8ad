//! Unit tests for bg-world.
//!
//! All tests build small hand-crafted worlds on a 16×16 grid.

#[cfg(test)]
mod helpers {
    use bg_core::{CandidateId, CategoryId, Cell, GridBounds};
    use crate::{Candidate, CandidateIndex};

    pub const BOUNDS: GridBounds = GridBounds::new(16, 16);

    pub fn cand(id: u32, category: u16, x: i32, y: i32) -> Candidate {
        Candidate::new(CandidateId(id), CategoryId(category), Cell::new(x, y))
    }

    /// Two categories: 0 → {0, 1, 2}, 1 → {3, 4}.
    pub fn small_index() -> CandidateIndex {
        CandidateIndex::from_candidates([
            cand(0, 0, 1, 1),
            cand(1, 0, 5, 5),
            cand(2, 0, 9, 2),
            cand(3, 1, 0, 15),
            cand(4, 1, 3, 3),
        ])
        .unwrap()
    }
}

// ── Offsets ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod offset_tests {
    use bg_core::Cell;
    use crate::{OffsetCell, OffsetShape, OffsetTable, Refresh};
    use super::helpers::BOUNDS;

    #[test]
    fn table_drops_out_of_bounds_cells() {
        let table = OffsetTable::compute(Cell::new(0, 0), &OffsetShape::standard(), BOUNDS);
        assert_eq!(table.targets, vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 1)]);
    }

    #[test]
    fn refresh_reports_init_then_unchanged_then_moved() {
        let cell  = OffsetCell::new();
        let shape = OffsetShape::single();
        assert_eq!(cell.refresh(Cell::new(2, 2), &shape, BOUNDS), Refresh::Initialized);
        assert_eq!(cell.refresh(Cell::new(2, 2), &shape, BOUNDS), Refresh::Unchanged);
        assert_eq!(
            cell.refresh(Cell::new(3, 2), &shape, BOUNDS),
            Refresh::Moved { from: Cell::new(2, 2) },
        );
        assert_eq!(cell.writes(), 2);
    }

    #[test]
    fn stale_table_is_not_fresh() {
        let cell = OffsetCell::new();
        cell.refresh(Cell::new(2, 2), &OffsetShape::single(), BOUNDS);
        assert!(cell.fresh_for(Cell::new(2, 2)).is_some());
        assert!(cell.fresh_for(Cell::new(4, 4)).is_none());
        assert!(cell.current().is_some());
    }

    #[test]
    fn get_or_compute_fills_missing_entry_once() {
        let cell  = OffsetCell::new();
        let shape = OffsetShape::standard();
        let (first, computed) = cell.get_or_compute(Cell::new(5, 5), &shape, BOUNDS);
        assert!(computed);
        assert_eq!(first.targets.len(), 5);
        let (_, computed_again) = cell.get_or_compute(Cell::new(5, 5), &shape, BOUNDS);
        assert!(!computed_again);
        assert_eq!(cell.writes(), 1);
    }

    #[test]
    fn shape_labels_parse() {
        assert_eq!(OffsetShape::from_label("single"), Some(OffsetShape::single()));
        assert_eq!(OffsetShape::from_label(" standard "), Some(OffsetShape::standard()));
        assert_eq!(OffsetShape::from_label("ring"), None);
    }
}

// ── CandidateIndex / ErrandBoard ──────────────────────────────────────────────

#[cfg(test)]
mod index_tests {
    use bg_core::{AgentId, CandidateId, CategoryId, Cell, ErrandId};
    use crate::{Errand, ErrandBoard, WorldError};
    use super::helpers::{cand, small_index};

    #[test]
    fn shards_by_category() {
        let index = small_index();
        assert_eq!(index.len(), 5);
        assert_eq!(index.shards().len(), 2);
        assert_eq!(index.shard(CategoryId(0)).map(|s| s.len()), Some(3));
        assert_eq!(index.shard(CategoryId(1)).map(|s| s.len()), Some(2));
        assert!(index.shard(CategoryId(7)).is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut index = small_index();
        let err = index.insert(cand(2, 1, 0, 0)).unwrap_err();
        assert!(matches!(err, WorldError::DuplicateCandidate(CandidateId(2))));
    }

    #[test]
    fn remove_keeps_lookup_consistent() {
        let mut index = small_index();
        let before = index.version();
        let removed = index.remove(CandidateId(0)).unwrap();
        assert_eq!(removed.id, CandidateId(0));
        assert!(index.version() > before);
        // The swapped-in element must still be reachable by id.
        for id in [1, 2, 3, 4] {
            assert_eq!(index.get(CandidateId(id)).map(|c| c.id), Some(CandidateId(id)));
        }
        assert!(index.get(CandidateId(0)).is_none());
        assert!(index.remove(CandidateId(0)).is_none());
    }

    #[test]
    fn move_bumps_version_only_on_change() {
        let mut index = small_index();
        let v0 = index.version();
        assert_eq!(index.move_to(CandidateId(1), Cell::new(5, 5)).unwrap(), Cell::new(5, 5));
        assert_eq!(index.version(), v0);
        index.move_to(CandidateId(1), Cell::new(6, 5)).unwrap();
        assert_eq!(index.version(), v0 + 1);
        assert!(index.move_to(CandidateId(99), Cell::new(0, 0)).is_err());
    }

    #[test]
    fn generations_separate_indices_with_equal_versions() {
        let a = small_index();
        let b = small_index();
        assert_eq!(a.version(), b.version());
        assert_ne!(a.generation(), b.generation());

        let mut copy = a.clone();
        assert_eq!(copy.generation(), a.generation());
        copy.remove(CandidateId(0));
        assert_eq!(copy.generation(), a.generation());
        assert_ne!(copy.version(), a.version());
    }

    #[test]
    fn claims_gate_other_agents() {
        let mut index = small_index();
        index.set_claim(CandidateId(3), Some(AgentId(1))).unwrap();
        let c = index.get(CandidateId(3)).unwrap();
        assert!(c.claimable_by(AgentId(1)));
        assert!(!c.claimable_by(AgentId(2)));
    }

    #[test]
    fn errand_board_keeps_order_after_remove() {
        let mut board = ErrandBoard::from_errands(
            (0..4).map(|i| Errand::new(ErrandId(i), CategoryId(0), Cell::new(i as i32, 0))),
        )
        .unwrap();
        board.remove(ErrandId(1));
        let ids: Vec<u32> = board.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![0, 2, 3]);
        assert_eq!(board.get(ErrandId(3)).map(|e| e.destination), Some(Cell::new(3, 0)));
        assert!(board.insert(Errand::new(ErrandId(2), CategoryId(0), Cell::new(0, 0))).is_err());
    }
}

// ── Nav oracle ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod nav_tests {
    use bg_core::Cell;
    use crate::{ManhattanOracle, NavOracle, NavState, OffsetShape, OffsetTable};
    use super::helpers::BOUNDS;

    #[test]
    fn manhattan_takes_cheapest_target() {
        let oracle = ManhattanOracle::new(2);
        let table  = OffsetTable::compute(Cell::new(5, 5), &OffsetShape::standard(), BOUNDS);
        // Nearest target from (0, 5) is (4, 5): 4 cells × 2.
        let cost = oracle.cost(&NavState::at(Cell::new(0, 5)), Cell::new(5, 5), &table);
        assert_eq!(cost, Some(8));
    }

    #[test]
    fn fully_blocked_target_is_unreachable() {
        let oracle = ManhattanOracle::default().with_blocked([Cell::new(5, 5)]);
        let table  = OffsetTable::compute(Cell::new(5, 5), &OffsetShape::single(), BOUNDS);
        assert_eq!(oracle.cost(&NavState::at(Cell::new(0, 0)), Cell::new(5, 5), &table), None);
    }
}

// ── Refresh + deferred drain + partition ──────────────────────────────────────

#[cfg(test)]
mod refresh_tests {
    use std::sync::Arc;

    use bg_core::{CandidateId, CategoryId, Cell, ErrandId};
    use crate::{
        CandidateIndex, DeferredQueue, DeferredUpdate, Errand, ErrandBoard, ManhattanOracle,
        RefreshStats, SpatialPartition, World, apply_deferred, refresh_shard,
    };
    use super::helpers::{BOUNDS, cand, small_index};

    fn refresh_all(world: &World, deferred: &DeferredQueue) -> RefreshStats {
        let mut total = RefreshStats::default();
        for shard in world.candidates().unwrap().shards() {
            total += refresh_shard(shard, world.bounds(), deferred);
        }
        total
    }

    #[test]
    fn second_refresh_without_movement_writes_nothing() {
        let world    = World::new(BOUNDS).with_candidates(small_index());
        let deferred = DeferredQueue::new();

        let first = refresh_all(&world, &deferred);
        assert_eq!(first.initialized, 5);
        let snapshot: Vec<_> = world.candidates().unwrap().iter().map(|c| c.offsets.current()).collect();
        let writes: u64 = world.candidates().unwrap().iter().map(|c| c.offsets.writes()).sum();

        let second = refresh_all(&world, &deferred);
        assert_eq!(second.writes(), 0);
        assert_eq!(second.unchanged, 5);
        let again: Vec<_> = world.candidates().unwrap().iter().map(|c| c.offsets.current()).collect();
        assert_eq!(snapshot, again);
        let writes_after: u64 = world.candidates().unwrap().iter().map(|c| c.offsets.writes()).sum();
        assert_eq!(writes, writes_after);
    }

    #[test]
    fn moved_candidate_is_relocated_on_drain() {
        let mut world     = World::new(BOUNDS).with_candidates(small_index());
        let mut partition = SpatialPartition::bulk_load(world.candidates().unwrap());
        let deferred      = DeferredQueue::new();
        refresh_all(&world, &deferred);
        apply_deferred(&world, &mut partition, &deferred);

        world.candidates_mut().unwrap().move_to(CandidateId(1), Cell::new(12, 12)).unwrap();
        let stats = refresh_all(&world, &deferred);
        assert_eq!(stats.moved, 1);
        assert_eq!(deferred.len(), 1);
        // The partition is untouched until the drain.
        assert_eq!(partition.cell_of(CandidateId(1)), Some(Cell::new(5, 5)));

        let drained = apply_deferred(&world, &mut partition, &deferred);
        assert_eq!(drained.relocated, 1);
        assert!(deferred.is_empty());
        assert_eq!(partition.at(Cell::new(12, 12)), vec![CandidateId(1)]);
        assert!(partition.at(Cell::new(5, 5)).is_empty());
    }

    #[test]
    fn relocation_of_removed_candidate_drops_entry() {
        let mut world     = World::new(BOUNDS).with_candidates(small_index());
        let mut partition = SpatialPartition::bulk_load(world.candidates().unwrap());
        let deferred      = DeferredQueue::new();
        deferred.push(DeferredUpdate::Relocate { candidate: CandidateId(4), to: Cell::new(3, 3) });
        world.candidates_mut().unwrap().remove(CandidateId(4));

        let drained = apply_deferred(&world, &mut partition, &deferred);
        assert_eq!(drained.removed, 1);
        assert_eq!(partition.len(), 4);
    }

    #[test]
    fn destination_refresh_populates_errand_cache() {
        let board = ErrandBoard::from_errands([Errand::new(ErrandId(0), CategoryId(0), Cell::new(8, 8))]).unwrap();
        let world = World::new(BOUNDS)
            .with_candidates(small_index())
            .with_errands(board)
            .with_oracle(Arc::new(ManhattanOracle::default()));
        let mut partition = SpatialPartition::new();
        let deferred      = DeferredQueue::new();
        deferred.push(DeferredUpdate::RefreshDestination(ErrandId(0)));
        deferred.push(DeferredUpdate::RefreshDestination(ErrandId(9)));

        let drained = apply_deferred(&world, &mut partition, &deferred);
        assert_eq!(drained.refreshed, 1);
        assert_eq!(drained.ignored, 1);
        let errand = world.errands().get(ErrandId(0)).unwrap();
        assert!(errand.offsets.fresh_for(Cell::new(8, 8)).is_some());
    }

    #[test]
    fn radius_query_and_prune() {
        let mut index     = small_index();
        let mut partition = SpatialPartition::bulk_load(&index);
        assert_eq!(partition.within(Cell::new(2, 2), 2), vec![CandidateId(0), CandidateId(4)]);

        index.remove(CandidateId(0));
        assert_eq!(partition.prune(&index), 1);
        assert_eq!(partition.within(Cell::new(2, 2), 2), vec![CandidateId(4)]);
    }

    #[test]
    fn far_apart_cells_do_not_overflow_distance() {
        let far = CandidateIndex::from_candidates([
            cand(0, 0, -1_000_000, 0),
            cand(1, 0, 1_000_000, 2_000_000),
            cand(2, 0, 60_000, -60_000),
        ])
        .unwrap();
        let partition = SpatialPartition::bulk_load(&far);
        assert_eq!(partition.within(Cell::new(-1_000_000, 3), 3), vec![CandidateId(0)]);
        assert!(partition.within(Cell::new(0, 0), u32::MAX).contains(&CandidateId(1)));
        assert_eq!(partition.within(Cell::new(-60_000, 60_000), 1), Vec::<CandidateId>::new());
        assert_eq!(partition.at(Cell::new(60_000, -60_000)), vec![CandidateId(2)]);
    }

    #[test]
    fn missing_dependencies_are_reported_in_order() {
        use crate::MissingDependency;
        let bare = World::new(BOUNDS);
        assert_eq!(bare.missing_dependency(), Some(MissingDependency::CandidateIndex));
        let no_oracle = bare.clone().with_candidates(small_index());
        assert_eq!(no_oracle.missing_dependency(), Some(MissingDependency::NavOracle));
        let full = no_oracle.with_oracle(Arc::new(ManhattanOracle::default()));
        assert_eq!(full.missing_dependency(), None);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use std::io::Cursor;

    use bg_core::{CandidateId, CategoryId, Cell, ErrandId, Priority, TagSet};
    use crate::{OffsetShape, WorldError, load_candidates_reader, load_errands_reader};

    #[test]
    fn loads_candidates() {
        let csv = "id,category,cell_x,cell_y,priority,tags,shape,automation_excluded\n\
                   0,1,10,12,1,0|2,standard,false\n\
                   1,1,4,3,2,,single,true\n";
        let index = load_candidates_reader(Cursor::new(csv)).unwrap();
        assert_eq!(index.len(), 2);
        let c0 = index.get(CandidateId(0)).unwrap();
        assert_eq!(c0.tags, TagSet::single(0).with(2));
        assert_eq!(c0.cell, Cell::new(10, 12));
        let c1 = index.get(CandidateId(1)).unwrap();
        assert_eq!(c1.priority, Priority(2));
        assert_eq!(c1.shape, OffsetShape::single());
        assert!(c1.automation_excluded);
        assert_eq!(index.shard(CategoryId(1)).map(|s| s.len()), Some(2));
    }

    #[test]
    fn loads_errands() {
        let csv = "id,category,dest_x,dest_y,priority,tags\n0,1,20,20,5,2\n1,3,0,0,0,\n";
        let board = load_errands_reader(Cursor::new(csv)).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board.get(ErrandId(0)).map(|e| e.tags), Some(TagSet::single(2)));
        assert_eq!(board.get(ErrandId(1)).map(|e| e.tags), Some(TagSet::EMPTY));
    }

    #[test]
    fn bad_shape_is_a_parse_error() {
        let csv = "id,category,cell_x,cell_y,priority,tags,shape,automation_excluded\n\
                   0,1,1,1,1,,hexagon,false\n";
        let err = load_candidates_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, WorldError::Parse(_)));
    }

    #[test]
    fn out_of_range_tag_is_rejected() {
        let csv = "id,category,dest_x,dest_y,priority,tags\n0,1,0,0,0,64\n";
        assert!(matches!(load_errands_reader(Cursor::new(csv)), Err(WorldError::Parse(_))));
    }
}
