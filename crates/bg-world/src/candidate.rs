//! Candidates and the category-sharded candidate index.
//!
//! # Sharding
//!
//! Candidates are grouped into one [`CategoryShard`] per category.  Shards
//! never share candidates, so the refresh stage can hand each shard to a
//! different worker without any locking beyond the per-candidate offset cell.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use bg_core::{AgentId, CandidateId, CategoryId, Cell, Priority, TagSet};

use crate::{OffsetCell, OffsetShape, WorldError, WorldResult};

// ── Candidate ─────────────────────────────────────────────────────────────────

/// An entity offering a resource that agents may pick up.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub id:       CandidateId,
    pub category: CategoryId,
    pub tags:     TagSet,
    pub priority: Priority,
    /// Current location.  Only the orchestrating thread changes it, between
    /// cycles, via [`CandidateIndex::move_to`].
    pub cell:     Cell,
    pub shape:    OffsetShape,
    /// Agent currently holding a claim on this candidate, if any.
    pub claimed_by: Option<AgentId>,
    /// Automated agents must not pick this candidate up.
    pub automation_excluded: bool,
    /// Cached interaction cells for `cell`.
    pub offsets: OffsetCell,
}

impl Candidate {
    pub fn new(id: CandidateId, category: CategoryId, cell: Cell) -> Self {
        Self {
            id,
            category,
            tags:                TagSet::EMPTY,
            priority:            Priority::default(),
            cell,
            shape:               OffsetShape::default(),
            claimed_by:          None,
            automation_excluded: false,
            offsets:             OffsetCell::new(),
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_shape(mut self, shape: OffsetShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn claimed_by(mut self, agent: AgentId) -> Self {
        self.claimed_by = Some(agent);
        self
    }

    pub fn excluded_from_automation(mut self) -> Self {
        self.automation_excluded = true;
        self
    }

    /// `false` if another agent already claimed this candidate.
    #[inline]
    pub fn claimable_by(&self, agent: AgentId) -> bool {
        self.claimed_by.is_none_or(|owner| owner == agent)
    }
}

// ── CategoryShard ─────────────────────────────────────────────────────────────

/// All candidates of one category.
#[derive(Clone, Debug)]
pub struct CategoryShard {
    pub category:   CategoryId,
    pub candidates: Vec<Candidate>,
}

impl CategoryShard {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

// ── CandidateIndex ────────────────────────────────────────────────────────────

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Category-partitioned store of every active candidate.
///
/// `version` increases on every structural change (insert, remove, move) so
/// consumers can tell whether derived indices need rebuilding.  Versions are
/// only comparable within one `generation`: every new index gets a fresh one,
/// clones keep theirs.
#[derive(Clone, Debug)]
pub struct CandidateIndex {
    shards:     Vec<CategoryShard>,
    shard_of:   FxHashMap<CategoryId, usize>,
    /// `CandidateId → (shard, position)`.
    by_id:      FxHashMap<CandidateId, (usize, usize)>,
    generation: u64,
    version:    u64,
}

impl Default for CandidateIndex {
    fn default() -> Self {
        Self {
            shards:     Vec::new(),
            shard_of:   FxHashMap::default(),
            by_id:      FxHashMap::default(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            version:    0,
        }
    }
}

impl CandidateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an iterator, rejecting duplicate ids.
    pub fn from_candidates<I: IntoIterator<Item = Candidate>>(candidates: I) -> WorldResult<Self> {
        let mut index = Self::new();
        for candidate in candidates {
            index.insert(candidate)?;
        }
        Ok(index)
    }

    pub fn insert(&mut self, candidate: Candidate) -> WorldResult<()> {
        if self.by_id.contains_key(&candidate.id) {
            return Err(WorldError::DuplicateCandidate(candidate.id));
        }
        let shard = match self.shard_of.get(&candidate.category) {
            Some(&s) => s,
            None => {
                self.shards.push(CategoryShard {
                    category:   candidate.category,
                    candidates: Vec::new(),
                });
                let s = self.shards.len() - 1;
                self.shard_of.insert(candidate.category, s);
                s
            }
        };
        let pos = self.shards[shard].candidates.len();
        self.by_id.insert(candidate.id, (shard, pos));
        self.shards[shard].candidates.push(candidate);
        self.version += 1;
        Ok(())
    }

    /// Remove a candidate.  Order within its shard is not preserved.
    pub fn remove(&mut self, id: CandidateId) -> Option<Candidate> {
        let (shard, pos) = self.by_id.remove(&id)?;
        let list    = &mut self.shards[shard].candidates;
        let removed = list.swap_remove(pos);
        if let Some(moved) = list.get(pos) {
            self.by_id.insert(moved.id, (shard, pos));
        }
        self.version += 1;
        Some(removed)
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        let &(shard, pos) = self.by_id.get(&id)?;
        self.shards[shard].candidates.get(pos)
    }

    /// Relocate a candidate, returning its previous cell.
    ///
    /// Only the cell changes; the offset cache notices the move on the next
    /// refresh (or the next compile-stage read).
    pub fn move_to(&mut self, id: CandidateId, cell: Cell) -> WorldResult<Cell> {
        let &(shard, pos) = self.by_id.get(&id).ok_or(WorldError::UnknownCandidate(id))?;
        let candidate = &mut self.shards[shard].candidates[pos];
        let previous  = std::mem::replace(&mut candidate.cell, cell);
        if previous != cell {
            self.version += 1;
        }
        Ok(previous)
    }

    /// Set or clear the claim on a candidate.
    pub fn set_claim(&mut self, id: CandidateId, agent: Option<AgentId>) -> WorldResult<()> {
        let &(shard, pos) = self.by_id.get(&id).ok_or(WorldError::UnknownCandidate(id))?;
        self.shards[shard].candidates[pos].claimed_by = agent;
        Ok(())
    }

    pub fn shards(&self) -> &[CategoryShard] {
        &self.shards
    }

    pub fn shard(&self, category: CategoryId) -> Option<&CategoryShard> {
        self.shard_of.get(&category).map(|&s| &self.shards[s])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.shards.iter().flat_map(|s| s.candidates.iter())
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Identity of this index, unique per process.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
