//! `bg-world` — the per-cycle world snapshot: candidates, errands, caches.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`candidate`] | `Candidate`, `CategoryShard`, `CandidateIndex` (versioned)|
//! | [`errand`]    | `Errand`, `ErrandBoard`                                   |
//! | [`offsets`]   | `OffsetShape`, `OffsetTable`, `OffsetCell` cache          |
//! | [`nav`]       | `NavState`, `NavOracle` trait, `ManhattanOracle`          |
//! | [`partition`] | `SpatialPartition` R-tree over candidate cells            |
//! | [`deferred`]  | `DeferredQueue`, `apply_deferred`                         |
//! | [`refresh`]   | `refresh_shard` — the parallel offset pre-pass            |
//! | [`world`]     | `World` snapshot, `MissingDependency`                     |
//! | [`loader`]    | CSV scenario loading                                      |
//! | [`error`]     | `WorldError`, `WorldResult<T>`                            |
//!
//! # Threading
//!
//! | Structure          | Workers           | Orchestrator               |
//! |--------------------|-------------------|----------------------------|
//! | `CandidateIndex`   | read              | mutate between cycles      |
//! | `OffsetCell`       | idempotent writes | refresh errands on drain   |
//! | `SpatialPartition` | never             | read + mutate              |
//! | `DeferredQueue`    | push              | drain after the barrier    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Enables `serde` derives on `bg-core` types.                  |

pub mod candidate;
pub mod deferred;
pub mod errand;
pub mod error;
pub mod loader;
pub mod nav;
pub mod offsets;
pub mod partition;
pub mod refresh;
pub mod world;

#[cfg(test)]
mod tests;

pub use candidate::{Candidate, CandidateIndex, CategoryShard};
pub use deferred::{DeferredQueue, DeferredUpdate, DrainStats, apply_deferred};
pub use errand::{Errand, ErrandBoard};
pub use error::{WorldError, WorldResult};
pub use loader::{load_candidates_csv, load_candidates_reader, load_errands_csv, load_errands_reader};
pub use nav::{ManhattanOracle, NavOracle, NavState};
pub use offsets::{OffsetCell, OffsetShape, OffsetTable, Refresh};
pub use partition::SpatialPartition;
pub use refresh::{RefreshStats, refresh_shard};
pub use world::{MissingDependency, World};
