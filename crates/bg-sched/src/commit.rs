//! Shared commit targets: the last committed fetch and pickup lists per agent.

use rustc_hash::FxHashMap;

use bg_core::{AgentId, CommitStrategy};
use bg_fetch::{Fetch, FetchWorkItem, Pickup};

/// Per-agent result slots, read by the simulation between cycles.
///
/// Only the orchestrating thread writes here, and only during commit.
#[derive(Debug, Default)]
pub struct CommitTargets {
    fetches: FxHashMap<AgentId, Vec<Fetch>>,
    pickups: FxHashMap<AgentId, Vec<Pickup>>,
}

impl CommitTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite `agent`'s slots with the item's buffers.
    ///
    /// `FastSwap` exchanges the vectors, leaving the previous slot contents in
    /// the item; the item is cleaned before reuse, so nothing leaks into the
    /// next cycle.
    pub fn publish(&mut self, agent: AgentId, item: &mut FetchWorkItem, strategy: CommitStrategy) {
        let fetches = self.fetches.entry(agent).or_default();
        let pickups = self.pickups.entry(agent).or_default();
        match strategy {
            CommitStrategy::SafeCopy => {
                fetches.clear();
                fetches.extend_from_slice(&item.fetches);
                pickups.clear();
                pickups.extend_from_slice(&item.pickups);
            }
            CommitStrategy::FastSwap => {
                std::mem::swap(fetches, &mut item.fetches);
                std::mem::swap(pickups, &mut item.pickups);
            }
        }
    }

    pub fn fetches_for(&self, agent: AgentId) -> &[Fetch] {
        self.fetches.get(&agent).map_or(&[], Vec::as_slice)
    }

    pub fn pickups_for(&self, agent: AgentId) -> &[Pickup] {
        self.pickups.get(&agent).map_or(&[], Vec::as_slice)
    }

    /// Drop a despawned agent's slots.  Returns `true` if it had any.
    pub fn forget(&mut self, agent: AgentId) -> bool {
        let had_fetches = self.fetches.remove(&agent).is_some();
        let had_pickups = self.pickups.remove(&agent).is_some();
        had_fetches || had_pickups
    }

    /// Number of agents with committed slots.
    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty() && self.fetches.is_empty()
    }
}
