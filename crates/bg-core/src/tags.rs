//! Tag sets and priorities.

use std::fmt;

/// A set of up to 64 tags stored as a bitmask.
///
/// Candidates carry the tags they satisfy; agents and errands carry the tags
/// they are interested in.  An empty interest set matches everything.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSet(pub u64);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    /// A set containing the single tag `bit` (0..64).
    #[inline]
    pub const fn single(bit: u8) -> TagSet {
        TagSet(1u64 << (bit & 63))
    }

    #[inline]
    pub const fn with(self, bit: u8) -> TagSet {
        TagSet(self.0 | (1u64 << (bit & 63)))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn intersects(self, other: TagSet) -> bool {
        self.0 & other.0 != 0
    }

    /// `true` if a holder of `self` satisfies the interest set `wanted`.
    #[inline]
    pub const fn satisfies(self, wanted: TagSet) -> bool {
        wanted.is_empty() || self.intersects(wanted)
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }
}

/// Errand/candidate priority.  Higher sorts first.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priority(pub i32);

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}
