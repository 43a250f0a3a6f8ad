//! Scheduler configuration.
//!
//! # Barrier budget
//!
//! The orchestrating thread blocks once per cycle waiting for the worker
//! pool.  `barrier_timeout_ms` bounds that wait; it should sit well inside one
//! simulation tick (the host ticks roughly every 200 ms).  A cycle that misses
//! the bound is discarded, never partially committed.

use std::fmt;
use std::time::Duration;

use crate::{BgError, BgResult, GridBounds};

/// Default barrier wait ceiling in milliseconds.
pub const DEFAULT_BARRIER_TIMEOUT_MS: u64 = 100;

// ── CommitStrategy ────────────────────────────────────────────────────────────

/// How a finished work item's buffers reach the shared commit targets.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommitStrategy {
    /// Clear the shared slot, then append the work item's entries.
    /// O(total items).
    #[default]
    SafeCopy,
    /// Exchange the shared slot's buffer with the work item's buffer.  O(1).
    ///
    /// Requires that no producer of the next cycle is running during commit.
    /// The scheduler guarantees this by never dispatching a cycle before the
    /// previous commit returns.
    FastSwap,
}

impl CommitStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitStrategy::SafeCopy => "safe_copy",
            CommitStrategy::FastSwap => "fast_swap",
        }
    }
}

impl fmt::Display for CommitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── SchedulerConfig ───────────────────────────────────────────────────────────

/// Top-level scheduler configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the scheduler builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Upper bound on the barrier wait, in milliseconds.
    pub barrier_timeout_ms: u64,

    /// Publish strategy used during commit.
    pub commit_strategy: CommitStrategy,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Candidates whose navigation cost exceeds this are not shortlisted.
    /// `None` means unbounded.
    pub max_cost: Option<u32>,

    /// World grid size; offset tables never reference cells outside it.
    pub bounds: GridBounds,
}

impl SchedulerConfig {
    #[inline]
    pub fn barrier_timeout(&self) -> Duration {
        Duration::from_millis(self.barrier_timeout_ms)
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> BgResult<()> {
        if self.barrier_timeout_ms == 0 {
            return Err(BgError::Config("barrier_timeout_ms must be > 0".into()));
        }
        if self.num_threads == Some(0) {
            return Err(BgError::Config("num_threads must be > 0 when set".into()));
        }
        if self.bounds.is_empty() {
            return Err(BgError::Config(format!(
                "grid bounds {}x{} are empty",
                self.bounds.width, self.bounds.height
            )));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            barrier_timeout_ms: DEFAULT_BARRIER_TIMEOUT_MS,
            commit_strategy:    CommitStrategy::SafeCopy,
            num_threads:        None,
            max_cost:           None,
            bounds:             GridBounds::default(),
        }
    }
}
