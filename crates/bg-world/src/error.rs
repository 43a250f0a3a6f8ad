//! World-state error type.

use thiserror::Error;

use bg_core::{CandidateId, ErrandId};

/// Errors produced by `bg-world`.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("candidate {0} is already indexed")]
    DuplicateCandidate(CandidateId),

    #[error("candidate {0} not found in index")]
    UnknownCandidate(CandidateId),

    #[error("errand {0} is already on the board")]
    DuplicateErrand(ErrandId),

    #[error("errand {0} not found on board")]
    UnknownErrand(ErrandId),

    #[error("scenario parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
