//! Fluent builder for constructing a [`BrainScheduler`].

use std::sync::Arc;

use tracing::warn;

use bg_core::SchedulerConfig;
use bg_jobs::JobRunner;
use bg_world::{CandidateIndex, ErrandBoard, NavOracle, SpatialPartition, World};

use crate::{BrainScheduler, SchedError, SchedResult};

/// Fluent builder for [`BrainScheduler`].
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                                          |
/// |--------------------|--------------------------------------------------|
/// | `.candidates(i)`   | none: every cycle is skipped                     |
/// | `.errands(b)`      | empty board                                      |
/// | `.oracle(o)`       | none: only the refresh stage runs                |
/// | `.runner(r)`       | a fresh pool with `config.num_threads` threads   |
/// | `.without_pool()`  | off: every cycle takes the inline path           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sched = SchedulerBuilder::new(SchedulerConfig::default())
///     .candidates(index)
///     .errands(board)
///     .oracle(Arc::new(ManhattanOracle::default()))
///     .build()?;
/// sched.run_cycle(agents, &mut NoopHooks)?;
/// ```
pub struct SchedulerBuilder {
    config:     SchedulerConfig,
    candidates: Option<CandidateIndex>,
    errands:    ErrandBoard,
    oracle:     Option<Arc<dyn NavOracle>>,
    runner:     Option<JobRunner>,
    use_pool:   bool,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            candidates: None,
            errands:    ErrandBoard::new(),
            oracle:     None,
            runner:     None,
            use_pool:   true,
        }
    }

    pub fn candidates(mut self, index: CandidateIndex) -> Self {
        self.candidates = Some(index);
        self
    }

    pub fn errands(mut self, board: ErrandBoard) -> Self {
        self.errands = board;
        self
    }

    pub fn oracle(mut self, oracle: Arc<dyn NavOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Share an existing runner instead of building a dedicated pool.
    pub fn runner(mut self, runner: JobRunner) -> Self {
        self.runner   = Some(runner);
        self.use_pool = true;
        self
    }

    pub fn without_pool(mut self) -> Self {
        self.runner   = None;
        self.use_pool = false;
        self
    }

    /// Validate the config, index the candidates, and start the pool.
    ///
    /// A pool that fails to start is not an error: the scheduler logs a
    /// warning and runs every cycle inline.
    pub fn build(self) -> SchedResult<BrainScheduler> {
        self.config.validate()?;
        if self.config.max_cost == Some(0) {
            return Err(SchedError::Config("max_cost must be positive when set".into()));
        }

        let partition = self
            .candidates
            .as_ref()
            .map(SpatialPartition::bulk_load)
            .unwrap_or_default();

        let mut world = World::new(self.config.bounds).with_errands(self.errands);
        world.set_candidates(self.candidates);
        world.set_oracle(self.oracle);

        let runner = match (self.use_pool, self.runner) {
            (false, _)            => None,
            (true, Some(runner))  => Some(runner),
            (true, None) => match JobRunner::new(self.config.num_threads) {
                Ok(runner) => Some(runner),
                Err(e) => {
                    warn!(error = %e, "worker pool unavailable; cycles will run inline");
                    None
                }
            },
        };

        Ok(BrainScheduler::from_parts(self.config, world, partition, runner))
    }
}
