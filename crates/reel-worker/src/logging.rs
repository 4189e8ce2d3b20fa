//! Structured logging for reel jobs.
//!
//! Every event carries the `job_id` field, so one run can be followed by
//! filtering on it. Checkpoints log the stage and progress that were published
//! to the store.

use std::fmt::Display;
use std::time::Duration;
use tracing::{error, info, warn, Span};

use reel_models::{JobId, JobUpdate, ReelRequest};

/// Logger bound to one job.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.clone(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// The request a run was started with.
    pub fn log_start(&self, request: &ReelRequest) {
        info!(
            job_id = %self.job_id,
            topic = %request.topic,
            language = %request.language,
            duration_seconds = request.duration_seconds,
            style = %request.style,
            voice = %request.voice_gender,
            music = %request.music,
            subtitles = request.add_subtitles,
            "reel job started"
        );
    }

    /// A progress checkpoint about to be published.
    pub fn log_checkpoint(&self, update: &JobUpdate) {
        info!(
            job_id = %self.job_id,
            stage = %update.stage,
            progress = update.progress,
            "{}", update.message
        );
    }

    pub fn log_script(&self, title: &str, scenes: usize) {
        info!(job_id = %self.job_id, title, scenes, "script generated");
    }

    /// One scene's narration clip or image landed on disk.
    pub fn log_scene_asset(&self, kind: &'static str, order: u32, provider: &str, bytes: usize) {
        info!(
            job_id = %self.job_id,
            kind,
            scene = order,
            provider,
            bytes,
            "scene asset written"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, "{}", message);
    }

    /// The run ended in `Failed` while in `stage`.
    pub fn log_failure(&self, stage: &str, error: &dyn Display) {
        error!(job_id = %self.job_id, stage, error = %error, "reel job failed");
    }

    pub fn log_completion(&self, elapsed: Duration) {
        info!(
            job_id = %self.job_id,
            elapsed_secs = elapsed.as_secs_f64(),
            "reel job completed"
        );
    }

    /// Span wrapping the whole background run of a job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("reel_job", job_id = %self.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::JobStage;

    #[test]
    fn test_logger_keeps_job_id() {
        let job_id = JobId::from_string("abc");
        let logger = JobLogger::new(&job_id);
        assert_eq!(logger.job_id(), &job_id);

        // Logging without a subscriber installed is a no-op.
        logger.log_start(&ReelRequest::new("coffee facts"));
        logger.log_checkpoint(&JobUpdate::new(JobStage::GeneratingScript, 10, "Generating viral script..."));
        logger.log_failure("generating_audio", &"speech service unavailable");
        let _span = logger.create_span();
    }
}
