//! Fetch errands and the global errand board.

use rustc_hash::FxHashMap;

use bg_core::{AgentId, CategoryId, Cell, ErrandId, Priority, TagSet};

use crate::{OffsetCell, OffsetShape, WorldError, WorldResult};

/// "Bring something of `category` (matching `tags`) to `destination`."
#[derive(Clone, Debug)]
pub struct Errand {
    pub id:          ErrandId,
    pub category:    CategoryId,
    /// Tags a pickup must carry; empty accepts any candidate of the category.
    pub tags:        TagSet,
    pub priority:    Priority,
    pub destination: Cell,
    pub shape:       OffsetShape,
    pub claimed_by:  Option<AgentId>,
    /// Cached interaction cells around `destination`.  Written only by the
    /// orchestrating thread when it drains the deferred queue.
    pub offsets:     OffsetCell,
}

impl Errand {
    pub fn new(id: ErrandId, category: CategoryId, destination: Cell) -> Self {
        Self {
            id,
            category,
            tags:        TagSet::EMPTY,
            priority:    Priority::default(),
            destination,
            shape:       OffsetShape::single(),
            claimed_by:  None,
            offsets:     OffsetCell::new(),
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

    #[inline]
    pub fn claimable_by(&self, agent: AgentId) -> bool {
        self.claimed_by.is_none_or(|owner| owner == agent)
    }
}

/// The single shared list of errands, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct ErrandBoard {
    errands: Vec<Errand>,
    by_id:   FxHashMap<ErrandId, usize>,
}

impl ErrandBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_errands<I: IntoIterator<Item = Errand>>(errands: I) -> WorldResult<Self> {
        let mut board = Self::new();
        for errand in errands {
            board.insert(errand)?;
        }
        Ok(board)
    }

    pub fn insert(&mut self, errand: Errand) -> WorldResult<()> {
        if self.by_id.contains_key(&errand.id) {
            return Err(WorldError::DuplicateErrand(errand.id));
        }
        self.by_id.insert(errand.id, self.errands.len());
        self.errands.push(errand);
        Ok(())
    }

    /// Remove an errand, keeping the order of the rest.
    pub fn remove(&mut self, id: ErrandId) -> Option<Errand> {
        let pos     = self.by_id.remove(&id)?;
        let removed = self.errands.remove(pos);
        for (i, errand) in self.errands.iter().enumerate().skip(pos) {
            self.by_id.insert(errand.id, i);
        }
        Some(removed)
    }

    pub fn get(&self, id: ErrandId) -> Option<&Errand> {
        self.by_id.get(&id).map(|&i| &self.errands[i])
    }

    pub fn set_claim(&mut self, id: ErrandId, agent: Option<AgentId>) -> WorldResult<()> {
        let &i = self.by_id.get(&id).ok_or(WorldError::UnknownErrand(id))?;
        self.errands[i].claimed_by = agent;
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Errand> {
        self.errands.iter()
    }

    pub fn len(&self) -> usize {
        self.errands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errands.is_empty()
    }
}
