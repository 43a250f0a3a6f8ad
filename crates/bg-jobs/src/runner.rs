//! `JobRunner` — fire-and-forget batch execution on a Rayon pool.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{error, warn};

use crate::section::WorkerGuard;
use crate::{JobError, JobResult, ParallelSection, WorkBatch};

/// Shared worker pool plus the shutdown flag and parallel-section counter.
///
/// Cloning is cheap: all clones drive the same pool.  [`run`](Self::run)
/// never blocks the caller; completion is observed only through the batch's
/// callbacks.
#[derive(Clone)]
pub struct JobRunner {
    pool:     Arc<ThreadPool>,
    shutdown: Arc<AtomicBool>,
    section:  ParallelSection,
}

impl JobRunner {
    /// Build a dedicated pool.  `None` uses one thread per logical core.
    pub fn new(num_threads: Option<usize>) -> JobResult<Self> {
        // A panicking lifecycle callback must not take the process down; the
        // barrier simply times out for that cycle.
        let mut builder = ThreadPoolBuilder::new()
            .thread_name(|i| format!("bg-worker-{i}"))
            .panic_handler(|_| error!("batch callback panicked on a worker thread"));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| JobError::PoolBuild(e.to_string()))?;
        Ok(Self::from_pool(Arc::new(pool)))
    }

    /// Wrap an existing pool (e.g. one shared with other subsystems).
    pub fn from_pool(pool: Arc<ThreadPool>) -> Self {
        Self {
            pool,
            shutdown: Arc::new(AtomicBool::new(false)),
            section:  ParallelSection::new(),
        }
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// `false` once [`shutdown`](Self::shutdown) has been called.
    #[inline]
    pub fn is_available(&self) -> bool {
        !self.shutdown.load(Ordering::Acquire)
    }

    /// Refuse new batches and cut in-flight ones short (they receive
    /// `trigger_abort`).  Items already executing run to completion.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn section(&self) -> &ParallelSection {
        &self.section
    }

    /// Schedule `batch` on the pool and return immediately.
    ///
    /// # Errors
    ///
    /// [`JobError::PoolUnavailable`] after shutdown; the batch's callbacks are
    /// not invoked in that case.
    pub fn run<B: WorkBatch>(&self, batch: Arc<B>) -> JobResult<()> {
        if !self.is_available() {
            return Err(JobError::PoolUnavailable);
        }
        let runner = self.clone();
        self.pool.spawn(move || runner.execute(batch.as_ref()));
        Ok(())
    }

    fn execute<B: WorkBatch>(&self, batch: &B) {
        self.section.enter();
        batch.trigger_start();

        let count   = batch.count();
        let aborted = AtomicBool::new(false);

        (0..count).into_par_iter().for_each(|index| {
            if aborted.load(Ordering::Relaxed) || !self.is_available() {
                aborted.store(true, Ordering::Relaxed);
                return;
            }
            let _worker = WorkerGuard::enter();
            if catch_unwind(AssertUnwindSafe(|| batch.do_work_item(index))).is_err() {
                error!(index, "work item panicked; aborting batch");
                aborted.store(true, Ordering::Relaxed);
            }
        });

        // Leave the section before the final callback: completion may release
        // the orchestrating thread, which checks `section.is_active()`.
        self.section.exit();

        if aborted.into_inner() {
            warn!(count, "batch aborted before all items ran");
            batch.trigger_abort();
        } else {
            batch.trigger_complete();
        }
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("num_threads", &self.num_threads())
            .field("available", &self.is_available())
            .field("section_depth", &self.section.depth())
            .finish()
    }
}
