//! Background job execution.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, Instrument};

use reel_media::{remove_dir_if_exists, remove_file_if_exists};
use reel_models::{JobId, JobStage, ReelRequest, ReelResponse};
use reel_store::{JobStore, StoreError};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::paths::JobPaths;
use crate::pipeline::ReelPipeline;

/// Message returned when a job is accepted.
pub const ACCEPTED_MESSAGE: &str = "Reel generation started. Poll the status endpoint with the job_id.";

/// Runs pipeline jobs in the background with bounded concurrency.
///
/// Submission returns as soon as the job record exists; the run itself waits
/// for a permit, so excess jobs stay `Pending` until a slot frees up.
#[derive(Clone)]
pub struct JobExecutor {
    store: Arc<dyn JobStore>,
    pipeline: Arc<ReelPipeline>,
    job_semaphore: Arc<Semaphore>,
}

impl JobExecutor {
    pub fn new(store: Arc<dyn JobStore>, pipeline: Arc<ReelPipeline>) -> Self {
        let permits = pipeline.config().max_concurrent_jobs.max(1);
        Self {
            store,
            pipeline,
            job_semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn config(&self) -> &WorkerConfig {
        self.pipeline.config()
    }

    /// Create a job and start its run in the background.
    ///
    /// The request must already be validated.
    pub async fn submit(&self, request: ReelRequest) -> WorkerResult<ReelResponse> {
        let job = self.store.create().await?;
        let job_id = job.job_id.clone();
        let estimated_time_seconds = request.estimated_time_seconds();
        metrics::record_job_submitted();
        info!(job_id = %job_id, topic = %request.topic, "job submitted");

        let logger = JobLogger::new(&job_id);
        let span = logger.create_span();
        let pipeline = Arc::clone(&self.pipeline);
        let store = Arc::clone(&self.store);
        let semaphore = Arc::clone(&self.job_semaphore);
        let run_id = job_id.clone();

        tokio::spawn(
            async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let err = WorkerError::ExecutorClosed;
                        logger.log_failure(JobStage::Pending.as_str(), &err);
                        if let Err(store_err) = store.fail(&run_id, &err.to_string()).await {
                            logger.log_warning(&format!("could not record failure: {}", store_err));
                        }
                        return;
                    }
                };
                pipeline.run(run_id, request).await;
            }
            .instrument(span),
        );

        Ok(ReelResponse {
            job_id,
            message: ACCEPTED_MESSAGE.to_string(),
            estimated_time_seconds,
        })
    }

    /// Delete a job's record and artifacts. Missing files are ignored.
    pub async fn delete(&self, job_id: &JobId) -> WorkerResult<()> {
        self.store.get(job_id).await?;

        let paths = JobPaths::new(self.config(), job_id);
        let removed_work = remove_dir_if_exists(&paths.work_dir).await?;
        let removed_output = remove_file_if_exists(&paths.output_path).await?;
        if self.store.remove(job_id).await?.is_none() {
            return Err(StoreError::NotFound(job_id.clone()).into());
        }

        info!(
            job_id = %job_id,
            removed_work,
            removed_output,
            "job deleted"
        );
        Ok(())
    }

    /// Stop accepting new runs. Jobs already holding a permit finish.
    pub fn close(&self) {
        self.job_semaphore.close();
    }
}
