use thiserror::Error;

use bg_core::{AgentId, BgError};

use crate::CyclePhase;

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("{operation} is not allowed in phase {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase:     CyclePhase,
    },

    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("agent {0} was already added this cycle")]
    DuplicateAgent(AgentId),

    #[error(transparent)]
    Core(#[from] BgError),
}

pub type SchedResult<T> = Result<T, SchedError>;
