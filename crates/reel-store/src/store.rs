//! The job store capability.

use async_trait::async_trait;

use reel_models::{Job, JobId, JobUpdate};

use crate::error::StoreResult;

/// Storage for job records.
///
/// Writes for one id come from the single pipeline run that owns it, so
/// implementations only need per-key atomicity.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create and store a new pending job.
    async fn create(&self) -> StoreResult<Job>;

    /// Insert a job record, failing if the id is taken.
    async fn put(&self, job: Job) -> StoreResult<()>;

    /// Snapshot of a job. Unknown ids are `NotFound`.
    async fn get(&self, job_id: &JobId) -> StoreResult<Job>;

    /// Apply a forward update atomically. Unknown ids are a no-op.
    async fn update(&self, job_id: &JobId, update: JobUpdate) -> StoreResult<()>;

    /// Mark a job failed. Unknown ids are a no-op.
    async fn fail(&self, job_id: &JobId, error: &str) -> StoreResult<()>;

    /// Remove a job record, returning it if present.
    async fn remove(&self, job_id: &JobId) -> StoreResult<Option<Job>>;

    /// Number of stored jobs.
    async fn count(&self) -> usize;
}
