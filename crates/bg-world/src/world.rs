//! `World` — the immutable-per-cycle snapshot every stage reads.
//!
//! The scheduler holds the world in an `Arc`.  Stages share it read-only;
//! mutation between cycles goes through `Arc::make_mut`, so a job still
//! running from a timed-out cycle keeps reading the snapshot it started with.

use std::fmt;
use std::sync::Arc;

use bg_core::GridBounds;

use crate::{CandidateIndex, ErrandBoard, NavOracle};

/// A collaborator a stage needs but the world does not have.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MissingDependency {
    CandidateIndex,
    NavOracle,
}

impl MissingDependency {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingDependency::CandidateIndex => "candidate_index",
            MissingDependency::NavOracle      => "nav_oracle",
        }
    }
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Default)]
pub struct World {
    bounds:     GridBounds,
    candidates: Option<CandidateIndex>,
    errands:    ErrandBoard,
    oracle:     Option<Arc<dyn NavOracle>>,
}

impl World {
    pub fn new(bounds: GridBounds) -> Self {
        Self { bounds, ..Self::default() }
    }

    pub fn with_candidates(mut self, index: CandidateIndex) -> Self {
        self.candidates = Some(index);
        self
    }

    pub fn with_errands(mut self, board: ErrandBoard) -> Self {
        self.errands = board;
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn NavOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn candidates(&self) -> Option<&CandidateIndex> {
        self.candidates.as_ref()
    }

    pub fn candidates_mut(&mut self) -> Option<&mut CandidateIndex> {
        self.candidates.as_mut()
    }

    pub fn set_candidates(&mut self, index: Option<CandidateIndex>) {
        self.candidates = index;
    }

    pub fn errands(&self) -> &ErrandBoard {
        &self.errands
    }

    pub fn errands_mut(&mut self) -> &mut ErrandBoard {
        &mut self.errands
    }

    pub fn oracle(&self) -> Option<&dyn NavOracle> {
        self.oracle.as_deref()
    }

    pub fn set_oracle(&mut self, oracle: Option<Arc<dyn NavOracle>>) {
        self.oracle = oracle;
    }

    /// The first collaborator missing for a full cycle, if any.
    ///
    /// A missing candidate index blocks every stage; a missing oracle blocks
    /// only compilation and finalization.
    pub fn missing_dependency(&self) -> Option<MissingDependency> {
        if self.candidates.is_none() {
            Some(MissingDependency::CandidateIndex)
        } else if self.oracle.is_none() {
            Some(MissingDependency::NavOracle)
        } else {
            None
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("bounds", &self.bounds)
            .field("candidates", &self.candidates.as_ref().map(CandidateIndex::len))
            .field("errands", &self.errands.len())
            .field("oracle", &self.oracle.is_some())
            .finish()
    }
}
