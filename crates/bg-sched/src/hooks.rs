//! Scheduler hooks: downstream updates and cycle reporting.

use bg_fetch::{Agent, Fetch, Pickup};

use crate::CycleOutcome;

/// Callbacks invoked by [`BrainScheduler::end_cycle_update`] on the
/// orchestrating thread.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: counting committed fetches
///
/// ```rust,ignore
/// struct FetchCounter(usize);
///
/// impl BrainHooks for FetchCounter {
///     fn on_committed(&mut self, _agent: &Agent, fetches: &[Fetch], _pickups: &[Pickup]) {
///         self.0 += fetches.len();
///     }
/// }
/// ```
///
/// [`BrainScheduler::end_cycle_update`]: crate::BrainScheduler::end_cycle_update
pub trait BrainHooks {
    /// Called once per agent, in cycle order, right after its buffers were
    /// published.  The slices are the freshly committed targets.
    fn on_committed(&mut self, _agent: &Agent, _fetches: &[Fetch], _pickups: &[Pickup]) {}

    /// Called once per agent when the cycle produced no results for it
    /// (no pool, timeout, abort, or a skipped stage).  The caller should run
    /// its own serial update.
    fn update_inline(&mut self, _agent: &Agent) {}

    /// Called once at the very end of `end_cycle_update`.
    fn on_cycle_end(&mut self, _outcome: &CycleOutcome) {}
}

/// A [`BrainHooks`] that does nothing.
pub struct NoopHooks;

impl BrainHooks for NoopHooks {}
