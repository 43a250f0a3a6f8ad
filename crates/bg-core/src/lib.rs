//! `bg-core` — foundational types for the `rust_bgu` fetch scheduler.
//!
//! This crate is a dependency of every other `bg-*` crate.  It has no `bg-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `CandidateId`, `ErrandId`, `CategoryId`         |
//! | [`grid`]   | `Cell`, `CellOffset`, `GridBounds`                         |
//! | [`tags`]   | `TagSet` bitmask, `Priority`                               |
//! | [`config`] | `SchedulerConfig`, `CommitStrategy`                        |
//! | [`error`]  | `BgError`, `BgResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod grid;
pub mod ids;
pub mod tags;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CommitStrategy, DEFAULT_BARRIER_TIMEOUT_MS, SchedulerConfig};
pub use error::{BgError, BgResult};
pub use grid::{Cell, CellOffset, GridBounds};
pub use ids::{AgentId, CandidateId, CategoryId, ErrandId};
pub use tags::{Priority, TagSet};
