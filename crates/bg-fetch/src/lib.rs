//! `bg-fetch` — per-agent shortlists and the stages that build them.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`agent`]     | `Agent` — id, nav state, priority and automation flags      |
//! | [`pickup`]    | `Pickup`, `pickup_order`                                    |
//! | [`fetch`]     | `Fetch`, `fetch_order`                                      |
//! | [`work_item`] | `FetchWorkItem` — reusable per-agent buffers                |
//! | [`context`]   | `StageContext<'a>` — read-only stage inputs                 |
//! | [`compile`]   | `compile_pickups` — parallel, one agent per item            |
//! | [`finalize`]  | `finalize_fetches` — serial errand pairing                  |
//!
//! # Design notes
//!
//! Both stages write only into the work item they are given.  Shared state
//! is reached through `&StageContext`, and the only interior writes are
//! idempotent offset-cache fills and pushes onto the deferred queue.  This is
//! what lets bg-sched run compilation for many agents at once without locks
//! beyond the per-item mutex.

pub mod agent;
pub mod compile;
pub mod context;
pub mod fetch;
pub mod finalize;
pub mod pickup;
pub mod work_item;

#[cfg(test)]
mod tests;

pub use agent::Agent;
pub use compile::compile_pickups;
pub use context::StageContext;
pub use fetch::{Fetch, fetch_order};
pub use finalize::finalize_fetches;
pub use pickup::{Pickup, is_shortlist_sorted, pickup_order};
pub use work_item::FetchWorkItem;
