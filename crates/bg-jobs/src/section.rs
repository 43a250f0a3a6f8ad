//! Parallel-section tracking.
//!
//! Two views of "is off-thread work in flight?":
//!
//! | Query                            | Scope                                   |
//! |----------------------------------|-----------------------------------------|
//! | [`ParallelSection::is_active`]   | any batch of this runner is executing    |
//! | [`on_worker_thread`]             | the *calling* thread is running an item  |
//!
//! The first lets the orchestrating thread postpone structural updates while a
//! straggler batch is still running; the second lets index code assert it is
//! not being mutated from inside a work item.

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

thread_local! {
    static ON_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// `true` while the calling thread is executing a work item.
#[inline]
pub fn on_worker_thread() -> bool {
    ON_WORKER.with(Cell::get)
}

/// RAII marker set around each `do_work_item` call.
pub(crate) struct WorkerGuard {
    previous: bool,
}

impl WorkerGuard {
    pub(crate) fn enter() -> Self {
        let previous = ON_WORKER.with(|flag| flag.replace(true));
        Self { previous }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let previous = self.previous;
        ON_WORKER.with(|flag| flag.set(previous));
    }
}

/// Count of batches currently between `trigger_start` and their final
/// callback.  Cheap to clone; all clones share one counter.
#[derive(Clone, Default, Debug)]
pub struct ParallelSection {
    active: Arc<AtomicUsize>,
}

impl ParallelSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn exit(&self) {
        let prev = self.active.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "parallel section exited more often than entered");
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) > 0
    }

    /// Number of batches in flight.
    pub fn depth(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}
