//! `bg-jobs` — worker pool, batch contract, and barrier primitives.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`batch`]   | `WorkBatch` trait (count, per-index work, lifecycle hooks)  |
//! | [`runner`]  | `JobRunner` — fire-and-forget execution on a Rayon pool     |
//! | [`section`] | `ParallelSection` counter, `on_worker_thread()`             |
//! | [`signal`]  | `CycleSignal` manual-reset event, `BatchEnd`                |
//! | [`pool`]    | `ItemPool<T>`, `Reusable`                                   |
//! | [`error`]   | `JobError`, `JobResult<T>`                                  |
//!
//! # Execution model
//!
//! ```text
//! orchestrator                pool thread              pool threads
//! ────────────                ───────────              ────────────
//! runner.run(batch) ──spawn──▶ trigger_start
//!   (returns at once)          for_each index ───────▶ do_work_item(i) …
//!                              ◀──────────── join ────
//!                              trigger_complete / trigger_abort
//! signal.wait_timeout ◀─────── (callback sets the CycleSignal)
//! ```

pub mod batch;
pub mod error;
pub mod pool;
pub mod runner;
pub mod section;
pub mod signal;


pub use batch::WorkBatch;
pub use error::{JobError, JobResult};
pub use pool::{ItemPool, Reusable};
pub use runner::JobRunner;
pub use section::{ParallelSection, on_worker_thread};
pub use signal::{BatchEnd, CycleSignal};
