//! Job records and the stage state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::Script;

/// Message shown for a freshly queued job.
pub const QUEUED_MESSAGE: &str = "Job queued";
/// Message shown once a job has failed.
pub const FAILED_MESSAGE: &str = "Generation failed";

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used in download filenames.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage of a job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    #[default]
    Pending,
    GeneratingScript,
    GeneratingAudio,
    GeneratingImages,
    ComposingVideo,
    Completed,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Pending => "pending",
            JobStage::GeneratingScript => "generating_script",
            JobStage::GeneratingAudio => "generating_audio",
            JobStage::GeneratingImages => "generating_images",
            JobStage::ComposingVideo => "composing_video",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }

    /// Position in the forward pipeline. `Failed` sits outside the ordering.
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            JobStage::Pending => Some(0),
            JobStage::GeneratingScript => Some(1),
            JobStage::GeneratingAudio => Some(2),
            JobStage::GeneratingImages => Some(3),
            JobStage::ComposingVideo => Some(4),
            JobStage::Completed => Some(5),
            JobStage::Failed => None,
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("job is already {0}")]
    Terminal(JobStage),

    #[error("cannot move backwards from {from} to {to}")]
    Backwards { from: JobStage, to: JobStage },

    #[error("use fail() to move a job to failed")]
    FailViaUpdate,
}

/// A forward update applied atomically to a job record.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub stage: JobStage,
    pub progress: u8,
    pub message: String,
    pub script: Option<Script>,
    pub download_url: Option<String>,
    pub output_path: Option<PathBuf>,
}

impl JobUpdate {
    pub fn new(stage: JobStage, progress: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress,
            message: message.into(),
            script: None,
            download_url: None,
            output_path: None,
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    pub fn with_result(mut self, download_url: impl Into<String>, output_path: PathBuf) -> Self {
        self.download_url = Some(download_url.into());
        self.output_path = Some(output_path);
        self
    }
}

/// A reel generation job as seen by status queries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub job_id: JobId,

    pub status: JobStage,

    /// Progress (0-100)
    pub progress: u8,

    pub message: String,

    /// Relative URL of the finished artifact
    pub download_url: Option<String>,

    /// Location of the finished artifact on disk
    #[serde(skip)]
    pub output_path: Option<PathBuf>,

    pub script: Option<Script>,

    pub error: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a pending job.
    pub fn new(job_id: JobId) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            status: JobStage::Pending,
            progress: 0,
            message: QUEUED_MESSAGE.to_string(),
            download_url: None,
            output_path: None,
            script: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a forward update.
    ///
    /// The stage may stay the same or move forward; progress never decreases.
    pub fn apply(&mut self, update: JobUpdate) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        let (Some(from), Some(to)) = (self.status.ordinal(), update.stage.ordinal()) else {
            return Err(TransitionError::FailViaUpdate);
        };
        if to < from {
            return Err(TransitionError::Backwards {
                from: self.status,
                to: update.stage,
            });
        }

        self.status = update.stage;
        self.progress = self.progress.max(update.progress.min(100));
        self.message = update.message;
        if let Some(script) = update.script {
            self.script = Some(script);
        }
        if let Some(url) = update.download_url {
            self.download_url = Some(url);
        }
        if let Some(path) = update.output_path {
            self.output_path = Some(path);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move the job to `Failed`, resetting progress.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        self.status = JobStage::Failed;
        self.progress = 0;
        self.message = FAILED_MESSAGE.to_string();
        self.error = Some(error.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStage::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = Job::new(JobId::new());
        assert_eq!(job.status, JobStage::Pending);
        assert_eq!(job.progress, 0);
        assert_eq!(job.message, QUEUED_MESSAGE);
    }

    #[test]
    fn test_checkpoints_move_forward() {
        let mut job = Job::new(JobId::new());
        let steps = [
            (JobStage::GeneratingScript, 10),
            (JobStage::GeneratingScript, 25),
            (JobStage::GeneratingAudio, 30),
            (JobStage::GeneratingAudio, 50),
            (JobStage::GeneratingImages, 55),
            (JobStage::GeneratingImages, 70),
            (JobStage::ComposingVideo, 75),
            (JobStage::Completed, 100),
        ];
        let mut last = 0;
        for (stage, progress) in steps {
            job.apply(JobUpdate::new(stage, progress, "step")).unwrap();
            assert!(job.progress >= last);
            last = job.progress;
        }
        assert!(job.is_completed());
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut job = Job::new(JobId::new());
        job.apply(JobUpdate::new(JobStage::GeneratingAudio, 50, "a"))
            .unwrap();
        job.apply(JobUpdate::new(JobStage::GeneratingAudio, 30, "b"))
            .unwrap();
        assert_eq!(job.progress, 50);
        assert_eq!(job.message, "b");
    }

    #[test]
    fn test_backwards_stage_rejected() {
        let mut job = Job::new(JobId::new());
        job.apply(JobUpdate::new(JobStage::GeneratingImages, 55, "img"))
            .unwrap();
        let err = job
            .apply(JobUpdate::new(JobStage::GeneratingScript, 60, "back"))
            .unwrap_err();
        assert!(matches!(err, TransitionError::Backwards { .. }));
        assert_eq!(job.status, JobStage::GeneratingImages);
    }

    #[test]
    fn test_fail_resets_progress() {
        let mut job = Job::new(JobId::new());
        job.apply(JobUpdate::new(JobStage::ComposingVideo, 75, "compose"))
            .unwrap();
        job.fail("ffmpeg exploded").unwrap();
        assert_eq!(job.status, JobStage::Failed);
        assert_eq!(job.progress, 0);
        assert_eq!(job.error.as_deref(), Some("ffmpeg exploded"));
        assert_eq!(job.message, FAILED_MESSAGE);
    }

    #[test]
    fn test_terminal_jobs_are_frozen() {
        let mut job = Job::new(JobId::new());
        job.fail("boom").unwrap();
        assert_eq!(
            job.apply(JobUpdate::new(JobStage::Completed, 100, "done")),
            Err(TransitionError::Terminal(JobStage::Failed))
        );
        assert!(job.fail("again").is_err());
    }

    #[test]
    fn test_failed_only_via_fail() {
        let mut job = Job::new(JobId::new());
        assert_eq!(
            job.apply(JobUpdate::new(JobStage::Failed, 0, "x")),
            Err(TransitionError::FailViaUpdate)
        );
    }

    #[test]
    fn test_job_serialization_hides_output_path() {
        let mut job = Job::new(JobId::from_string("abc"));
        job.output_path = Some(PathBuf::from("/tmp/out.mp4"));
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["job_id"], "abc");
        assert!(json.get("output_path").is_none());
    }

    #[test]
    fn test_short_id() {
        let id = JobId::from_string("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
        assert_eq!(JobId::from_string("abc").short(), "abc");
    }
}
