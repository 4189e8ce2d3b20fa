//! In-memory job store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use reel_models::{Job, JobId, JobUpdate};

use crate::error::{StoreError, StoreResult};
use crate::store::JobStore;

/// Process-lifetime job store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self) -> StoreResult<Job> {
        let job = Job::new(JobId::new());
        self.put(job.clone()).await?;
        Ok(job)
    }

    async fn put(&self, job: Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.job_id) {
            return Err(StoreError::AlreadyExists(job.job_id));
        }
        jobs.insert(job.job_id.clone(), job);
        Ok(())
    }

    async fn get(&self, job_id: &JobId) -> StoreResult<Job> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(job_id.clone()))
    }

    async fn update(&self, job_id: &JobId, update: JobUpdate) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            debug!(job_id = %job_id, "update for unknown job ignored");
            return Ok(());
        };
        job.apply(update)
            .map_err(|e| StoreError::invalid_transition(job_id, e))
    }

    async fn fail(&self, job_id: &JobId, error: &str) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            debug!(job_id = %job_id, "fail for unknown job ignored");
            return Ok(());
        };
        job.fail(error).map_err(|e| {
            warn!(job_id = %job_id, error = %e, "could not mark job failed");
            StoreError::invalid_transition(job_id, e)
        })
    }

    async fn remove(&self, job_id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.write().await.remove(job_id))
    }

    async fn count(&self) -> usize {
        self.jobs.read().await.len()
    }
}
