//! Grid cell type and interaction offsets.
//!
//! The world is a bounded 2-D grid of integer cells.  Candidates and errand
//! destinations are reached through *interaction offsets*: relative cells an
//! agent may stand on to interact with the target.

use std::fmt;

/// A grid cell.  `(0, 0)` is the bottom-left corner.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell reached by applying `offset` to `self`.
    #[inline]
    pub fn offset(self, offset: CellOffset) -> Cell {
        Cell::new(self.x + offset.dx, self.y + offset.dy)
    }

    /// Manhattan distance in cells.
    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A relative cell offset.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellOffset {
    pub dx: i32,
    pub dy: i32,
}

impl CellOffset {
    pub const ZERO: CellOffset = CellOffset { dx: 0, dy: 0 };

    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Grid dimensions.  Offset tables drop any cell outside these bounds.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    pub width:  u32,
    pub height: u32,
}

impl GridBounds {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn contains(self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as u32) < self.width
            && (cell.y as u32) < self.height
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn cell_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        // Matches the default colony map size.
        Self::new(256, 384)
    }
}
