//! `FetchWorkItem` — one agent's buffers for one cycle.

use bg_jobs::Reusable;

use crate::{Agent, Fetch, Pickup};

/// Scratch and result buffers for a single agent.
///
/// Items are recycled through an [`ItemPool`](bg_jobs::ItemPool): `cleanup`
/// clears every buffer but keeps its capacity.
#[derive(Debug, Default)]
pub struct FetchWorkItem {
    pub agent:          Option<Agent>,
    /// One scratch list per category shard, in shard order.
    pub shards:         Vec<Vec<Pickup>>,
    /// Concatenated shard lists; sorted in place into the shortlist.
    pub pickups:        Vec<Pickup>,
    pub fetches:        Vec<Fetch>,
    /// Offset tables this item had to compute itself.
    pub inline_offsets: usize,
}

impl FetchWorkItem {
    pub fn for_agent(agent: Agent) -> Self {
        Self { agent: Some(agent), ..Self::default() }
    }

    /// Prepare a recycled item for `agent`.
    pub fn assign(&mut self, agent: Agent) {
        self.cleanup();
        self.agent = Some(agent);
    }
}

impl Reusable for FetchWorkItem {
    fn cleanup(&mut self) {
        self.agent = None;
        for shard in &mut self.shards {
            shard.clear();
        }
        self.pickups.clear();
        self.fetches.clear();
        self.inline_offsets = 0;
    }
}
