//! `BrainScheduler` — the cycle state machine.
//!
//! # Tick driver
//!
//! ```text
//! start_cycle_collect()            Idle           → Collecting
//! add_agent(agent) *               Collecting
//! end_cycle_collect()              Collecting     → CycleStarted   (barrier reset)
//! start_cycle_update()             CycleStarted   → WorkersRunning (dispatch)
//! end_cycle_update(hooks)          WorkersRunning → BarrierWaiting → Committed → Idle
//! ```
//!
//! The orchestrating thread blocks exactly once per cycle, inside
//! `end_cycle_update`, for at most the configured barrier timeout.

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use bg_core::{AgentId, SchedulerConfig};
use bg_fetch::{Agent, FetchWorkItem};
use bg_jobs::{BatchEnd, CycleSignal, ItemPool, JobRunner};
use bg_world::{DeferredQueue, MissingDependency, SpatialPartition, World, apply_deferred};

use crate::cycle::{CycleJob, RefreshStage};
use crate::{
    BrainHooks, CommitTargets, CycleOutcome, CyclePhase, SchedError, SchedResult, SchedulerStats,
};

// ── Per-cycle plan ────────────────────────────────────────────────────────────

enum CyclePlan {
    None,
    Dispatched(Arc<CycleJob>),
    Inline,
    Skipped(MissingDependency),
}

// ── BrainScheduler ────────────────────────────────────────────────────────────

/// One scheduler per session.  Create via
/// [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct BrainScheduler {
    config:            SchedulerConfig,
    phase:             CyclePhase,
    world:             Arc<World>,
    partition:         SpatialPartition,
    /// `(generation, version)` of the candidate index the partition was last
    /// synced with.
    partition_synced:  Option<(u64, u64)>,
    runner:            Option<JobRunner>,
    pool:              ItemPool<FetchWorkItem>,
    agents:            Vec<Agent>,
    agent_ids:         FxHashSet<AgentId>,
    deferred:          Arc<DeferredQueue>,
    signal:            Arc<CycleSignal>,
    plan:              CyclePlan,
    /// Jobs abandoned at a timeout (or still referenced at commit); their
    /// items return to the pool once the last stage lets go.
    retired:           Vec<Arc<CycleJob>>,
    targets:           CommitTargets,
    stats:             SchedulerStats,
}

impl BrainScheduler {
    pub(crate) fn from_parts(
        config:    SchedulerConfig,
        world:     World,
        partition: SpatialPartition,
        runner:    Option<JobRunner>,
    ) -> Self {
        let partition_synced = world.candidates().map(|c| (c.generation(), c.version()));
        Self {
            config,
            phase: CyclePhase::Idle,
            world: Arc::new(world),
            partition,
            partition_synced,
            runner,
            pool: ItemPool::new(),
            agents: Vec::new(),
            agent_ids: FxHashSet::default(),
            deferred: Arc::new(DeferredQueue::new()),
            signal: Arc::new(CycleSignal::new()),
            plan: CyclePlan::None,
            retired: Vec::new(),
            targets: CommitTargets::new(),
            stats: SchedulerStats::default(),
        }
    }

    // ── Tick driver ───────────────────────────────────────────────────────

    pub fn start_cycle_collect(&mut self) -> SchedResult<()> {
        self.expect_phase("start_cycle_collect", CyclePhase::Idle)?;
        self.agents.clear();
        self.agent_ids.clear();
        self.phase = CyclePhase::Collecting;
        Ok(())
    }

    pub fn add_agent(&mut self, agent: Agent) -> SchedResult<()> {
        self.expect_phase("add_agent", CyclePhase::Collecting)?;
        if !self.agent_ids.insert(agent.id) {
            return Err(SchedError::DuplicateAgent(agent.id));
        }
        self.agents.push(agent);
        Ok(())
    }

    /// Fix the cycle's agent list and reset the barrier.
    ///
    /// First-priority agents move to the front; relative order is otherwise
    /// kept.
    pub fn end_cycle_collect(&mut self) -> SchedResult<()> {
        self.expect_phase("end_cycle_collect", CyclePhase::Collecting)?;
        self.agents.sort_by_key(|a| !a.first_priority);
        self.reclaim_retired();

        // A straggler from a timed-out cycle still holds the old signal and
        // may set it at any moment.
        if Arc::strong_count(&self.signal) > 1 {
            self.signal = Arc::new(CycleSignal::new());
        } else {
            self.signal.reset();
        }
        self.phase = CyclePhase::CycleStarted;
        Ok(())
    }

    /// Dispatch the cycle's stages and return without waiting.
    pub fn start_cycle_update(&mut self) -> SchedResult<()> {
        self.expect_phase("start_cycle_update", CyclePhase::CycleStarted)?;
        self.phase = CyclePhase::WorkersRunning;

        let missing = self.world.missing_dependency();
        if missing == Some(MissingDependency::CandidateIndex) {
            debug!("no candidate index; skipping all stages");
            self.plan = CyclePlan::Skipped(MissingDependency::CandidateIndex);
            return Ok(());
        }
        let Some(runner) = self.runner.as_ref().filter(|r| r.is_available()).cloned() else {
            debug!(agents = self.agents.len(), "no worker pool; agents update inline");
            self.plan = CyclePlan::Inline;
            return Ok(());
        };

        let mut items = self.pool.take_many(self.agents.len());
        for (item, agent) in items.iter_mut().zip(&self.agents) {
            item.assign(agent.clone());
        }
        // Without an oracle only the refresh stage runs.
        let compile = missing.is_none();
        let job = Arc::new(CycleJob {
            world:         Arc::clone(&self.world),
            items:         items.into_iter().map(parking_lot::Mutex::new).collect(),
            deferred:      Arc::clone(&self.deferred),
            signal:        Arc::clone(&self.signal),
            runner:        runner.clone(),
            max_cost:      self.config.max_cost,
            compile,
            refresh_stats: Default::default(),
        });

        trace!(agents = self.agents.len(), compile, "dispatching refresh stage");
        match runner.run(Arc::new(RefreshStage(Arc::clone(&job)))) {
            Ok(()) => self.plan = CyclePlan::Dispatched(job),
            Err(e) => {
                debug!(error = %e, "dispatch refused; agents update inline");
                self.recycle(job);
                self.plan = CyclePlan::Inline;
            }
        }
        Ok(())
    }

    /// Wait at the barrier, then commit or discard the cycle.
    ///
    /// Never blocks longer than the configured barrier timeout.  On any
    /// failure the commit targets are left untouched and every agent gets
    /// [`BrainHooks::update_inline`].
    pub fn end_cycle_update<H: BrainHooks + ?Sized>(&mut self, hooks: &mut H) -> SchedResult<CycleOutcome> {
        self.expect_phase("end_cycle_update", CyclePhase::WorkersRunning)?;
        self.phase = CyclePhase::BarrierWaiting;
        self.stats.cycles += 1;

        let outcome = match std::mem::replace(&mut self.plan, CyclePlan::None) {
            CyclePlan::None | CyclePlan::Inline => {
                self.stats.inline += 1;
                self.run_inline(hooks);
                CycleOutcome::Inline { agents: self.agents.len() }
            }
            CyclePlan::Skipped(missing) => {
                self.stats.skipped += 1;
                self.run_inline(hooks);
                CycleOutcome::Skipped(missing)
            }
            CyclePlan::Dispatched(job) => self.finish_dispatched(job, hooks),
        };

        self.drain_deferred();
        self.stats.stragglers = self.retired.len();
        hooks.on_cycle_end(&outcome);
        self.phase = CyclePhase::Idle;
        Ok(outcome)
    }

    /// Run one full cycle for `agents`.
    pub fn run_cycle<H, I>(&mut self, agents: I, hooks: &mut H) -> SchedResult<CycleOutcome>
    where
        H: BrainHooks + ?Sized,
        I: IntoIterator<Item = Agent>,
    {
        self.start_cycle_collect()?;
        for agent in agents {
            self.add_agent(agent)?;
        }
        self.end_cycle_collect()?;
        self.start_cycle_update()?;
        self.end_cycle_update(hooks)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Change the barrier timeout for subsequent cycles.  Zero is raised to
    /// one millisecond; anything past `u64::MAX` ms saturates.
    pub fn set_barrier_timeout(&mut self, timeout: Duration) {
        self.config.barrier_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access between cycles.
    ///
    /// Copy-on-write: if an abandoned job still reads the current snapshot,
    /// the world is cloned first and the job keeps the old copy.
    pub fn world_mut(&mut self) -> SchedResult<&mut World> {
        match self.phase {
            CyclePhase::Idle | CyclePhase::Collecting => {
                self.reclaim_retired();
                Ok(Arc::make_mut(&mut self.world))
            }
            phase => Err(SchedError::InvalidPhase { operation: "world_mut", phase }),
        }
    }

    pub fn targets(&self) -> &CommitTargets {
        &self.targets
    }

    pub fn partition(&self) -> &SpatialPartition {
        &self.partition
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Agents of the current (or last) cycle, in cycle order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Drop a despawned agent's commit slots.
    pub fn forget_agent(&mut self, agent: AgentId) -> bool {
        self.targets.forget(agent)
    }

    pub fn has_pool(&self) -> bool {
        self.runner.as_ref().is_some_and(JobRunner::is_available)
    }

    /// Stop using the worker pool.  In-flight batches abort; later cycles
    /// take the inline path.
    pub fn shutdown(&mut self) {
        if let Some(runner) = &self.runner {
            runner.shutdown();
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn expect_phase(&self, operation: &'static str, expected: CyclePhase) -> SchedResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SchedError::InvalidPhase { operation, phase: self.phase })
        }
    }

    fn finish_dispatched<H: BrainHooks + ?Sized>(
        &mut self,
        job:   Arc<CycleJob>,
        hooks: &mut H,
    ) -> CycleOutcome {
        let timeout = self.config.barrier_timeout();
        let outcome = match job.signal.wait_timeout(timeout) {
            None => {
                warn!(
                    timeout_ms = self.config.barrier_timeout_ms,
                    agents = self.agents.len(),
                    "barrier timed out; discarding cycle results"
                );
                self.stats.timed_out += 1;
                self.run_inline(hooks);
                CycleOutcome::TimedOut
            }
            Some(BatchEnd::Aborted) => {
                warn!(agents = self.agents.len(), "cycle aborted; discarding results");
                self.stats.aborted += 1;
                self.run_inline(hooks);
                CycleOutcome::Aborted
            }
            Some(BatchEnd::Completed) if !job.compile => {
                debug!("no nav oracle; compile and finalize skipped");
                self.stats.skipped += 1;
                self.stats.last_refresh = *job.refresh_stats.lock();
                self.run_inline(hooks);
                CycleOutcome::Skipped(MissingDependency::NavOracle)
            }
            Some(BatchEnd::Completed) => {
                self.phase = CyclePhase::Committed;
                self.stats.last_refresh = *job.refresh_stats.lock();
                self.commit(&job, hooks);
                self.stats.committed += 1;
                CycleOutcome::Committed { agents: self.agents.len() }
            }
        };
        self.recycle(job);
        outcome
    }

    fn commit<H: BrainHooks + ?Sized>(&mut self, job: &CycleJob, hooks: &mut H) {
        let strategy = self.config.commit_strategy;
        for (agent, item) in self.agents.iter().zip(&job.items) {
            let mut item = item.lock();
            self.stats.inline_offsets += item.inline_offsets as u64;
            self.targets.publish(agent.id, &mut item, strategy);
            drop(item);
            hooks.on_committed(
                agent,
                self.targets.fetches_for(agent.id),
                self.targets.pickups_for(agent.id),
            );
        }
    }

    fn run_inline<H: BrainHooks + ?Sized>(&self, hooks: &mut H) {
        for agent in &self.agents {
            hooks.update_inline(agent);
        }
    }

    /// Return the job's items to the pool, or park it until its last stage
    /// releases it.
    fn recycle(&mut self, job: Arc<CycleJob>) {
        match Arc::try_unwrap(job) {
            Ok(job) => self.pool.give_back_all(job.into_items()),
            Err(job) => self.retired.push(job),
        }
    }

    fn reclaim_retired(&mut self) {
        if self.retired.is_empty() {
            return;
        }
        let mut still_running = Vec::new();
        for job in std::mem::take(&mut self.retired) {
            match Arc::try_unwrap(job) {
                Ok(job) => self.pool.give_back_all(job.into_items()),
                Err(job) => still_running.push(job),
            }
        }
        self.retired = still_running;
        self.stats.stragglers = self.retired.len();
    }

    /// Apply deferred updates unless a stage is still running off-thread.
    fn drain_deferred(&mut self) {
        if self.runner.as_ref().is_some_and(|r| r.section().is_active()) {
            debug!(pending = self.deferred.len(), "work in flight; deferring drain");
            return;
        }
        self.sync_partition();
        let drained = apply_deferred(&self.world, &mut self.partition, &self.deferred);
        self.stats.deferred_drained += drained.total() as u64;
        self.stats.last_drain = drained;
    }

    /// Bring the partition in line with the current candidate index.
    ///
    /// A replaced index (new generation) is re-indexed from scratch; a
    /// mutated one only has its removed candidates pruned.
    fn sync_partition(&mut self) {
        let Some(index) = self.world.candidates() else {
            if self.partition_synced.take().is_some() || !self.partition.is_empty() {
                self.partition = SpatialPartition::new();
            }
            return;
        };
        let key = (index.generation(), index.version());
        match self.partition_synced {
            Some(synced) if synced == key => {}
            Some((generation, _)) if generation == key.0 => {
                let pruned = self.partition.prune(index);
                trace!(pruned, "partition pruned");
            }
            _ => {
                debug!(candidates = index.len(), "candidate index replaced; rebuilding partition");
                self.partition = SpatialPartition::bulk_load(index);
            }
        }
        self.partition_synced = Some(key);
    }
}
