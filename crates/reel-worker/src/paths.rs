//! Per-job artifact locations.

use std::path::{Path, PathBuf};

use reel_models::JobId;

use crate::config::WorkerConfig;

/// Where one job keeps its intermediate files and its finished reel.
///
/// Everything except the output lives under `work_dir`, which no other job
/// touches.
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub work_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub images_dir: PathBuf,
    pub output_path: PathBuf,
}

impl JobPaths {
    pub fn new(config: &WorkerConfig, job_id: &JobId) -> Self {
        let work_dir = config.temp_dir.join(job_id.as_str());
        Self {
            audio_dir: work_dir.join("audio"),
            images_dir: work_dir.join("images"),
            output_path: config.output_dir.join(format!("{}.mp4", job_id)),
            work_dir,
        }
    }

    pub fn audio_file(&self, order: u32) -> PathBuf {
        self.audio_dir.join(format!("scene_{:02}.mp3", order))
    }

    pub fn image_file(&self, order: u32) -> PathBuf {
        self.images_dir.join(format!("scene_{:02}.png", order))
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let config = WorkerConfig::rooted_at("/data/reels");
        let paths = JobPaths::new(&config, &JobId::from_string("abc"));

        assert_eq!(paths.work_dir, PathBuf::from("/data/reels/abc"));
        assert_eq!(paths.audio_file(1), PathBuf::from("/data/reels/abc/audio/scene_01.mp3"));
        assert_eq!(paths.image_file(12), PathBuf::from("/data/reels/abc/images/scene_12.png"));
        assert_eq!(paths.output_path, PathBuf::from("/data/reels/output/abc.mp4"));
    }
}
