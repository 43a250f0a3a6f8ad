//! Navigation-cost oracle.
//!
//! The scheduler never plans paths itself.  It asks a [`NavOracle`] for the
//! cost of reaching the cheapest cell of an [`OffsetTable`].  Implementations
//! are called concurrently from worker threads and must be `Send + Sync`.

use rustc_hash::FxHashSet;

use bg_core::Cell;

use crate::OffsetTable;

/// An agent's navigation state at the start of a cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct NavState {
    pub cell: Cell,
}

impl NavState {
    pub fn at(cell: Cell) -> Self {
        Self { cell }
    }
}

/// Pluggable reachability and cost query.
pub trait NavOracle: Send + Sync + 'static {
    /// Cost for an agent in `from` to reach the cheapest cell of `offsets`.
    ///
    /// `None` means unreachable.  `destination` is the entity's own cell,
    /// supplied for oracles that bias towards it.
    fn cost(&self, from: &NavState, destination: Cell, offsets: &OffsetTable) -> Option<u32>;
}

/// Manhattan-distance oracle with impassable cells.
///
/// The cost of a table is the smallest `cost_per_cell * distance` over its
/// non-blocked targets.
#[derive(Clone, Debug)]
pub struct ManhattanOracle {
    pub cost_per_cell: u32,
    pub blocked:       FxHashSet<Cell>,
}

impl ManhattanOracle {
    pub fn new(cost_per_cell: u32) -> Self {
        Self { cost_per_cell, blocked: FxHashSet::default() }
    }

    pub fn with_blocked<I: IntoIterator<Item = Cell>>(mut self, cells: I) -> Self {
        self.blocked.extend(cells);
        self
    }
}

impl Default for ManhattanOracle {
    fn default() -> Self {
        Self::new(1)
    }
}

impl NavOracle for ManhattanOracle {
    fn cost(&self, from: &NavState, _destination: Cell, offsets: &OffsetTable) -> Option<u32> {
        if self.blocked.contains(&from.cell) {
            return None;
        }
        offsets
            .targets
            .iter()
            .filter(|cell| !self.blocked.contains(cell))
            .map(|&cell| from.cell.manhattan(cell).saturating_mul(self.cost_per_cell))
            .min()
    }
}
