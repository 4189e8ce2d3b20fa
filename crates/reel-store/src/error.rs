//! Store error types.

use thiserror::Error;

use reel_models::{JobId, TransitionError};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job {job_id} rejected update: {source}")]
    InvalidTransition {
        job_id: JobId,
        #[source]
        source: TransitionError,
    },

    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),
}

impl StoreError {
    pub fn invalid_transition(job_id: &JobId, source: TransitionError) -> Self {
        Self::InvalidTransition {
            job_id: job_id.clone(),
            source,
        }
    }
}
