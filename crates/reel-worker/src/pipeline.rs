//! The reel generation pipeline.
//!
//! One run takes a job from `Pending` through script, narration, imagery and
//! composition, publishing fixed progress checkpoints to the job store. Any
//! error ends the run and marks the job failed; nothing is retried.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;

use reel_media::{
    build_captions, remove_dir_if_exists, remove_file_if_exists, CommandRunner, ComposeRequest,
    FfmpegRunner, VideoComposer,
};
use reel_models::{JobId, JobStage, JobUpdate, ReelRequest, Script};
use reel_providers::{ImageQuery, ProviderConfig, ProviderSet, ScriptRequest};
use reel_store::{JobStore, StoreError};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::paths::JobPaths;

/// Progress checkpoints published at stage boundaries.
pub mod checkpoints {
    pub const SCRIPT_STARTED: u8 = 10;
    pub const SCRIPT_READY: u8 = 25;
    pub const AUDIO_STARTED: u8 = 30;
    pub const AUDIO_READY: u8 = 50;
    pub const IMAGES_STARTED: u8 = 55;
    pub const IMAGES_READY: u8 = 70;
    pub const COMPOSE_STARTED: u8 = 75;
    pub const COMPLETED: u8 = 100;
}

/// Public download route for a finished job.
pub fn download_url(job_id: &JobId) -> String {
    format!("/api/download/{}", job_id)
}

/// How a run that did not fail ended.
enum RunOutcome {
    Completed,
    /// The job was deleted; nothing was published.
    Discarded,
}

/// Drives single jobs end to end.
pub struct ReelPipeline {
    store: Arc<dyn JobStore>,
    providers: ProviderSet,
    composer: VideoComposer,
    config: WorkerConfig,
}

impl ReelPipeline {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn JobStore>,
        providers: ProviderSet,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let composer = VideoComposer::new(runner, config.music_dir.clone());
        Self {
            store,
            providers,
            composer,
            config,
        }
    }

    /// Pipeline backed by the HTTP providers and the real FFmpeg binaries.
    pub fn with_defaults(
        config: WorkerConfig,
        provider_config: &ProviderConfig,
        store: Arc<dyn JobStore>,
    ) -> WorkerResult<Self> {
        let providers = ProviderSet::from_config(provider_config)?;
        let runner = FfmpegRunner::new().with_timeout(config.encode_timeout.as_secs());
        Ok(Self::new(config, store, providers, Arc::new(runner)))
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run one job to a terminal state.
    ///
    /// Never returns an error: failures are recorded on the job.
    pub async fn run(&self, job_id: JobId, request: ReelRequest) {
        let logger = JobLogger::new(&job_id);
        logger.log_start(&request);
        let started = Instant::now();

        match self.execute(&job_id, &request, &logger).await {
            Ok(RunOutcome::Completed) => {
                metrics::record_job_completed();
                logger.log_completion(started.elapsed());
            }
            Ok(RunOutcome::Discarded) => {}
            Err(e) => {
                let stage = match self.store.get(&job_id).await {
                    Ok(job) => job.status.as_str(),
                    Err(StoreError::NotFound(_)) => {
                        logger.log_warning(&format!("job deleted while running: {}", e));
                        self.discard_artifacts(&job_id, &logger).await;
                        return;
                    }
                    Err(_) => "unknown",
                };
                metrics::record_job_failed(stage);
                logger.log_failure(stage, &e);
                if let Err(store_err) = self.store.fail(&job_id, &e.to_string()).await {
                    logger.log_warning(&format!("could not record failure: {}", store_err));
                }
            }
        }
    }

    /// Remove whatever a run left on disk for a job that no longer exists.
    async fn discard_artifacts(&self, job_id: &JobId, logger: &JobLogger) {
        let paths = JobPaths::new(&self.config, job_id);
        if let Err(e) = remove_file_if_exists(&paths.output_path).await {
            logger.log_warning(&format!("could not remove output: {}", e));
        }
        if let Err(e) = remove_dir_if_exists(&paths.work_dir).await {
            logger.log_warning(&format!("could not remove work dir: {}", e));
        }
    }

    /// True when the job record has been deleted.
    async fn is_deleted(&self, job_id: &JobId) -> WorkerResult<bool> {
        match self.store.get(job_id).await {
            Ok(_) => Ok(false),
            Err(StoreError::NotFound(_)) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    async fn execute(
        &self,
        job_id: &JobId,
        request: &ReelRequest,
        logger: &JobLogger,
    ) -> WorkerResult<RunOutcome> {
        if self.is_deleted(job_id).await? {
            logger.log_warning("job deleted before it started, skipping run");
            return Ok(RunOutcome::Discarded);
        }

        let paths = JobPaths::new(&self.config, job_id);
        fs::create_dir_all(&paths.work_dir).await?;

        // Script
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::GeneratingScript,
                checkpoints::SCRIPT_STARTED,
                "Generating viral script...",
            ),
        )
        .await?;
        let script_request = ScriptRequest::from(request);
        let script = self
            .run_stage("script", Some(self.config.stage_timeout), async {
                Ok(self.providers.script.generate(&script_request).await?)
            })
            .await?;
        logger.log_script(&script.title, script.scenes.len());
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::GeneratingScript,
                checkpoints::SCRIPT_READY,
                "Script ready. Generating voice-over...",
            )
            .with_script(script.clone()),
        )
        .await?;

        // Narration
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::GeneratingAudio,
                checkpoints::AUDIO_STARTED,
                "Converting script to speech...",
            ),
        )
        .await?;
        let audio_paths = self
            .run_stage(
                "audio",
                Some(self.config.stage_timeout),
                self.generate_audio(&script, request, &paths, logger),
            )
            .await?;
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::GeneratingAudio,
                checkpoints::AUDIO_READY,
                "Voice-over ready. Creating scene visuals...",
            ),
        )
        .await?;

        // Imagery
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::GeneratingImages,
                checkpoints::IMAGES_STARTED,
                "Generating images for each scene...",
            ),
        )
        .await?;
        let image_paths = self
            .run_stage(
                "images",
                Some(self.config.stage_timeout),
                self.generate_images(&script, request, &paths, logger),
            )
            .await?;
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::GeneratingImages,
                checkpoints::IMAGES_READY,
                "Images ready. Composing the final video...",
            ),
        )
        .await?;

        // Composition
        let captions = if request.add_subtitles {
            build_captions(&script.scenes)
        } else {
            Vec::new()
        };
        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::ComposingVideo,
                checkpoints::COMPOSE_STARTED,
                "Assembling video with FFmpeg...",
            ),
        )
        .await?;
        let compose_request = ComposeRequest {
            work_dir: paths.work_dir.clone(),
            output_path: paths.output_path.clone(),
            image_paths,
            audio_paths,
            scene_durations: script.scene_durations(),
            add_subtitles: request.add_subtitles,
            captions,
            music: request.music,
        };
        // Each encode step is bounded by the runner's own timeout.
        let output_path = self
            .run_stage("compose", None, async {
                Ok(self.composer.compose(&compose_request).await?)
            })
            .await?;

        if self.is_deleted(job_id).await? {
            logger.log_warning("job deleted while running, discarding artifacts");
            self.discard_artifacts(job_id, logger).await;
            return Ok(RunOutcome::Discarded);
        }

        self.advance(
            job_id,
            logger,
            JobUpdate::new(
                JobStage::Completed,
                checkpoints::COMPLETED,
                "Reel generated successfully",
            )
            .with_result(download_url(job_id), output_path),
        )
        .await?;
        Ok(RunOutcome::Completed)
    }

    async fn advance(&self, job_id: &JobId, logger: &JobLogger, update: JobUpdate) -> WorkerResult<()> {
        logger.log_checkpoint(&update);
        self.store.update(job_id, update).await?;
        Ok(())
    }

    /// Time a stage, optionally bounding it.
    async fn run_stage<T, F>(
        &self,
        stage: &'static str,
        limit: Option<Duration>,
        fut: F,
    ) -> WorkerResult<T>
    where
        F: Future<Output = WorkerResult<T>>,
    {
        let started = Instant::now();
        let result = match limit {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| WorkerError::stage_timeout(stage, limit.as_secs()))?,
            None => fut.await,
        };
        metrics::record_stage_duration(stage, started.elapsed().as_secs_f64());
        result
    }

    /// Narration clips, one per scene, in scene order.
    async fn generate_audio(
        &self,
        script: &Script,
        request: &ReelRequest,
        paths: &JobPaths,
        logger: &JobLogger,
    ) -> WorkerResult<Vec<PathBuf>> {
        fs::create_dir_all(&paths.audio_dir).await?;
        let speech = &self.providers.speech;
        let voice = request.voice_gender;

        let clips: Vec<_> = script
            .scenes
            .iter()
            .map(|scene| async move {
                let audio = speech.synthesize(&scene.narration_text, voice).await?;
                let path = paths.audio_file(scene.order);
                fs::write(&path, &audio.bytes).await?;
                logger.log_scene_asset("narration", scene.order, audio.provider, audio.bytes.len());
                Ok::<_, WorkerError>(path)
            })
            .collect();

        stream::iter(clips)
            .buffered(self.config.max_scene_parallel.max(1))
            .try_collect()
            .await
    }

    /// Scene images, one per scene, in scene order.
    async fn generate_images(
        &self,
        script: &Script,
        request: &ReelRequest,
        paths: &JobPaths,
        logger: &JobLogger,
    ) -> WorkerResult<Vec<PathBuf>> {
        fs::create_dir_all(&paths.images_dir).await?;
        let images = &self.providers.images;
        let style = request.style;

        let frames: Vec<_> = script
            .scenes
            .iter()
            .map(|scene| async move {
                let query = ImageQuery {
                    visual_description: scene.visual_description.clone(),
                    style,
                    scene_order: scene.order,
                };
                let image = images.fetch(&query).await?;
                let path = paths.image_file(scene.order);
                fs::write(&path, &image.bytes).await?;
                logger.log_scene_asset("image", scene.order, image.provider, image.bytes.len());
                Ok::<_, WorkerError>(path)
            })
            .collect();

        stream::iter(frames)
            .buffered(self.config.max_scene_parallel.max(1))
            .try_collect()
            .await
    }
}
