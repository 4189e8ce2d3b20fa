//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{stage} timed out after {secs} seconds")]
    StageTimeout { stage: &'static str, secs: u64 },

    #[error("Executor is shut down")]
    ExecutorClosed,

    #[error("Provider error: {0}")]
    Provider(#[from] reel_providers::ProviderError),

    #[error("Media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("Store error: {0}")]
    Store(#[from] reel_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn stage_timeout(stage: &'static str, secs: u64) -> Self {
        Self::StageTimeout { stage, secs }
    }

    /// Whether the error means the job id is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkerError::Store(reel_store::StoreError::NotFound(_)))
    }
}
