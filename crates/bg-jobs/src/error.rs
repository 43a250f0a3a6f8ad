use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("worker pool is shut down and cannot accept work")]
    PoolUnavailable,

    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),
}

pub type JobResult<T> = Result<T, JobError>;
