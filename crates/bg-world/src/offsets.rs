//! Interaction offsets and the per-entity offset cache.
//!
//! # Staleness
//!
//! An [`OffsetTable`] is computed for one origin cell.  Once its owner moves,
//! the table is stale.  Readers therefore never trust a table blindly: they
//! ask for one *fresh for* the owner's current cell and recompute when the
//! cached origin differs.
//!
//! # Concurrency
//!
//! [`OffsetCell`] is owned by exactly one candidate or errand.  Workers may
//! write it concurrently (refresh stage and compile-stage fallbacks), but every
//! writer computes the same table from the same immutable inputs, so a
//! duplicate write is redundant, not racy.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use bg_core::{Cell, CellOffset, GridBounds};

// ── OffsetShape ───────────────────────────────────────────────────────────────

/// The relative cells from which an entity can be interacted with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetShape(Arc<[CellOffset]>);

impl OffsetShape {
    /// Reachable only from the entity's own cell.
    pub fn single() -> Self {
        Self(Arc::from([CellOffset::ZERO]))
    }

    /// Own cell plus the four orthogonal neighbours.
    pub fn standard() -> Self {
        Self(Arc::from([
            CellOffset::ZERO,
            CellOffset::new(-1, 0),
            CellOffset::new(1, 0),
            CellOffset::new(0, -1),
            CellOffset::new(0, 1),
        ]))
    }

    pub fn from_offsets(offsets: Vec<CellOffset>) -> Self {
        Self(Arc::from(offsets))
    }

    pub fn offsets(&self) -> &[CellOffset] {
        &self.0
    }

    /// Parse a shape label as used in scenario files.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "single"   => Some(Self::single()),
            "standard" => Some(Self::standard()),
            _          => None,
        }
    }
}

impl Default for OffsetShape {
    fn default() -> Self {
        Self::standard()
    }
}

// ── OffsetTable ───────────────────────────────────────────────────────────────

/// Absolute interaction cells for an entity standing at `origin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetTable {
    pub origin:  Cell,
    /// In-bounds target cells, in shape order, without duplicates.
    pub targets: Vec<Cell>,
}

impl OffsetTable {
    pub fn compute(origin: Cell, shape: &OffsetShape, bounds: GridBounds) -> Self {
        let mut targets = Vec::with_capacity(shape.offsets().len());
        for &offset in shape.offsets() {
            let cell = origin.offset(offset);
            if bounds.contains(cell) && !targets.contains(&cell) {
                targets.push(cell);
            }
        }
        Self { origin, targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

// ── OffsetCell ────────────────────────────────────────────────────────────────

/// Outcome of [`OffsetCell::refresh`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Refresh {
    /// Cached table already matched the cell; nothing written.
    Unchanged,
    /// No table existed; one was computed.
    Initialized,
    /// The owner moved away from `from`; the table was recomputed.
    Moved { from: Cell },
}

/// A single entity's cached [`OffsetTable`].
#[derive(Debug, Default)]
pub struct OffsetCell {
    slot:   RwLock<Option<Arc<OffsetTable>>>,
    writes: AtomicU64,
}

impl OffsetCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached table, whatever its origin.
    pub fn current(&self) -> Option<Arc<OffsetTable>> {
        self.slot.read().clone()
    }

    /// The cached table if it was computed for `cell`.
    pub fn fresh_for(&self, cell: Cell) -> Option<Arc<OffsetTable>> {
        self.slot
            .read()
            .as_ref()
            .filter(|table| table.origin == cell)
            .cloned()
    }

    /// Bring the cache in line with `cell`, writing only when it is missing
    /// or stale.
    pub fn refresh(&self, cell: Cell, shape: &OffsetShape, bounds: GridBounds) -> Refresh {
        let previous = match self.slot.read().as_ref() {
            Some(table) if table.origin == cell => return Refresh::Unchanged,
            Some(table) => Some(table.origin),
            None => None,
        };
        self.store(Arc::new(OffsetTable::compute(cell, shape, bounds)));
        match previous {
            Some(from) => Refresh::Moved { from },
            None       => Refresh::Initialized,
        }
    }

    /// Fresh table for `cell`, computing and storing it inline when missing.
    ///
    /// The flag is `true` when this call had to compute the table.
    pub fn get_or_compute(
        &self,
        cell:   Cell,
        shape:  &OffsetShape,
        bounds: GridBounds,
    ) -> (Arc<OffsetTable>, bool) {
        if let Some(table) = self.fresh_for(cell) {
            return (table, false);
        }
        let table = Arc::new(OffsetTable::compute(cell, shape, bounds));
        self.store(Arc::clone(&table));
        (table, true)
    }

    pub fn store(&self, table: Arc<OffsetTable>) {
        *self.slot.write() = Some(table);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of stores since creation.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Clone for OffsetCell {
    fn clone(&self) -> Self {
        Self {
            slot:   RwLock::new(self.current()),
            writes: AtomicU64::new(self.writes()),
        }
    }
}
