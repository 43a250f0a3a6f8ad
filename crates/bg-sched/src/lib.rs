//! `bg-sched` — cycle orchestrator for the rust_bgu fetch scheduler.
//!
//! # One cycle
//!
//! ```text
//! collect agents            (orchestrator)
//!   ① Refresh   : one work item per category shard; offset caches brought
//!                 up to date, relocations queued for later.
//!   ② Compile   : one work item per agent; sorted pickup shortlist.
//!   ③ Finalize  : serial, inside ②'s completion; errands paired with
//!                 pickups.  Releases the barrier.
//! barrier wait              (orchestrator, bounded)
//!   ④ Commit    : buffers published per agent in cycle order, each followed
//!                 by its downstream hook.
//!   ⑤ Drain     : deferred queue applied to the spatial partition and
//!                 errand caches.
//! ```
//!
//! A timeout, abort, missing collaborator or missing pool never escalates:
//! the cycle's results are dropped whole and agents take the inline path.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`scheduler`] | `BrainScheduler` state machine                            |
//! | [`builder`]   | `SchedulerBuilder`                                        |
//! | [`cycle`]     | `CyclePhase`, `CycleOutcome`, refresh + compile batches   |
//! | [`commit`]    | `CommitTargets` (safe copy / fast swap)                   |
//! | [`hooks`]     | `BrainHooks`, `NoopHooks`                                 |
//! | [`stats`]     | `SchedulerStats`                                          |
//! | [`error`]     | `SchedError`, `SchedResult<T>`                            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bg_sched::{NoopHooks, SchedulerBuilder};
//!
//! let mut sched = SchedulerBuilder::new(config)
//!     .candidates(index)
//!     .oracle(Arc::new(ManhattanOracle::default()))
//!     .build()?;
//! let outcome = sched.run_cycle(agents, &mut NoopHooks)?;
//! ```

pub mod builder;
pub mod commit;
pub mod cycle;
pub mod error;
pub mod hooks;
pub mod scheduler;
pub mod stats;


pub use builder::SchedulerBuilder;
pub use commit::CommitTargets;
pub use cycle::{CycleOutcome, CyclePhase};
pub use error::{SchedError, SchedResult};
pub use hooks::{BrainHooks, NoopHooks};
pub use scheduler::BrainScheduler;
pub use stats::SchedulerStats;

pub use bg_world::MissingDependency as SkipReason;
