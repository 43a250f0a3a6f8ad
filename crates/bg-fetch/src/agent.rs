//! The per-cycle agent record.

use bg_core::{AgentId, Cell, TagSet};
use bg_world::NavState;

/// An agent as seen by one cycle.  Collected by value at cycle start; the
/// caller owns the long-lived agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    pub id:             AgentId,
    pub nav:            NavState,
    /// Ordered ahead of everyone else in the cycle.
    pub first_priority: bool,
    /// Robot-like agents skip automation-excluded candidates.
    pub automated:      bool,
    /// Candidate tags this agent will pick up; empty accepts all.
    pub interests:      TagSet,
}

impl Agent {
    pub fn new(id: AgentId, cell: Cell) -> Self {
        Self {
            id,
            nav:            NavState::at(cell),
            first_priority: false,
            automated:      false,
            interests:      TagSet::EMPTY,
        }
    }

    pub fn with_interests(mut self, interests: TagSet) -> Self {
        self.interests = interests;
        self
    }

    pub fn first_priority(mut self) -> Self {
        self.first_priority = true;
        self
    }

    pub fn automated(mut self) -> Self {
        self.automated = true;
        self
    }
}
