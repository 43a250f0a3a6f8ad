//! Cycle phases, outcomes, and the two stage batches.
//!
//! # Stage chaining
//!
//! ```text
//! RefreshStage (one item per shard)
//!   └─ trigger_complete ─▶ runner.run(CompileStage)      (oracle present)
//!                       └▶ signal.set(Completed)         (oracle missing)
//! CompileStage (one item per agent)
//!   └─ trigger_complete ─▶ finalize every item serially ─▶ signal.set(Completed)
//! any trigger_abort     ─▶ signal.set(Aborted)
//! ```
//!
//! Launching compilation from the refresh batch's completion callback is the
//! count-down: it fires only after the last shard item has returned.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use bg_fetch::{FetchWorkItem, StageContext, compile_pickups, finalize_fetches};
use bg_jobs::{BatchEnd, CycleSignal, JobRunner, WorkBatch};
use bg_world::{DeferredQueue, MissingDependency, RefreshStats, World, refresh_shard};

// ── CyclePhase ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Collecting,
    /// Agents are fixed and the barrier is reset; nothing dispatched yet.
    CycleStarted,
    WorkersRunning,
    BarrierWaiting,
    Committed,
}

impl CyclePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            CyclePhase::Idle           => "idle",
            CyclePhase::Collecting     => "collecting",
            CyclePhase::CycleStarted   => "cycle_started",
            CyclePhase::WorkersRunning => "workers_running",
            CyclePhase::BarrierWaiting => "barrier_waiting",
            CyclePhase::Committed      => "committed",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── CycleOutcome ──────────────────────────────────────────────────────────────

/// How one cycle ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Results for `agents` agents were published.
    Committed { agents: usize },
    /// The barrier timed out; nothing was published.
    TimedOut,
    /// A stage aborted; nothing was published.
    Aborted,
    /// A collaborator was missing; dependent stages did not run.
    Skipped(MissingDependency),
    /// No usable pool; every agent took the inline path.
    Inline { agents: usize },
}

impl CycleOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CycleOutcome::Committed { .. })
    }
}

// ── CycleJob ──────────────────────────────────────────────────────────────────

/// Everything the stages of one dispatched cycle share.
///
/// Owned through an `Arc` by the scheduler and by whichever stage batch is in
/// flight.  A job abandoned at a timeout keeps its own world snapshot and
/// signal, so it can finish harmlessly in the background.
pub(crate) struct CycleJob {
    pub world:         Arc<World>,
    pub items:         Vec<Mutex<FetchWorkItem>>,
    pub deferred:      Arc<DeferredQueue>,
    pub signal:        Arc<CycleSignal>,
    pub runner:        JobRunner,
    pub max_cost:      Option<u32>,
    /// `false` when the oracle is missing: refresh only.
    pub compile:       bool,
    pub refresh_stats: Mutex<RefreshStats>,
}

impl CycleJob {
    fn context(&self) -> Option<StageContext<'_>> {
        StageContext::from_world(&self.world, self.max_cost)
    }

    /// Hand the items back once no stage holds the job.
    pub fn into_items(self) -> impl Iterator<Item = FetchWorkItem> {
        self.items.into_iter().map(Mutex::into_inner)
    }
}

// ── RefreshStage ──────────────────────────────────────────────────────────────

pub(crate) struct RefreshStage(pub Arc<CycleJob>);

impl WorkBatch for RefreshStage {
    fn count(&self) -> usize {
        self.0.world.candidates().map_or(0, |index| index.shards().len())
    }

    fn do_work_item(&self, index: usize) {
        let job = &self.0;
        let Some(shard) = job.world.candidates().and_then(|c| c.shards().get(index)) else {
            return;
        };
        let stats = refresh_shard(shard, job.world.bounds(), &job.deferred);
        *job.refresh_stats.lock() += stats;
    }

    fn trigger_complete(&self) {
        let job = &self.0;
        if !job.compile {
            job.signal.set(BatchEnd::Completed);
            return;
        }
        trace!(agents = job.items.len(), "refresh done; dispatching compile stage");
        if let Err(e) = job.runner.run(Arc::new(CompileStage(Arc::clone(job)))) {
            warn!(error = %e, "compile stage could not be scheduled");
            job.signal.set(BatchEnd::Aborted);
        }
    }

    fn trigger_abort(&self) {
        self.0.signal.set(BatchEnd::Aborted);
    }
}

// ── CompileStage ──────────────────────────────────────────────────────────────

pub(crate) struct CompileStage(pub Arc<CycleJob>);

impl WorkBatch for CompileStage {
    fn count(&self) -> usize {
        self.0.items.len()
    }

    fn do_work_item(&self, index: usize) {
        let job = &self.0;
        let Some(ctx) = job.context() else {
            return;
        };
        compile_pickups(&mut job.items[index].lock(), &ctx);
    }

    /// Finalization runs here, serially, before the barrier is released.
    fn trigger_complete(&self) {
        let job = &self.0;
        if let Some(ctx) = job.context() {
            for item in &job.items {
                finalize_fetches(&mut item.lock(), &ctx, &job.deferred);
            }
        }
        job.signal.set(BatchEnd::Completed);
    }

    fn trigger_abort(&self) {
        self.0.signal.set(BatchEnd::Aborted);
    }
}
