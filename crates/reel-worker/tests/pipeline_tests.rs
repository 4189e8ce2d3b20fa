//! End-to-end pipeline runs against fake providers and a fake encoder.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use reel_media::{CommandRunner, FfmpegCommand, MediaResult};
use reel_models::{
    Job, JobId, JobStage, JobUpdate, MusicGenre, ReelRequest, Scene, Script, VideoStyle,
    VoiceGender,
};
use reel_providers::{
    ImageChain, ImageProvider, ImageQuery, PlaceholderImageProvider, ProviderError,
    ProviderResult, ProviderSet, ScriptProvider, ScriptRequest, SpeechChain, SpeechProvider,
};
use reel_store::{InMemoryJobStore, JobStore, StoreResult};
use reel_worker::{JobExecutor, ReelPipeline, WorkerConfig};

fn three_scene_script() -> Script {
    let scenes = (1..=3)
        .map(|order| Scene {
            order,
            narration_text: format!("narration for scene number {}", order),
            visual_description: format!("scene {} visual", order),
            duration_seconds: 8.0,
            transition_kind: "fade".to_string(),
        })
        .collect();
    Script {
        title: "Test".to_string(),
        hook: "Did you know?".to_string(),
        scenes,
        call_to_action: "Follow for more".to_string(),
        hashtags: vec!["#test".to_string()],
        total_duration: 24.0,
    }
}

struct FakeScript {
    delay: Duration,
}

#[async_trait]
impl ScriptProvider for FakeScript {
    fn name(&self) -> &'static str {
        "fake-script"
    }

    async fn generate(&self, _request: &ScriptRequest) -> ProviderResult<Script> {
        tokio::time::sleep(self.delay).await;
        Ok(three_scene_script())
    }
}

struct FakeSpeech {
    fail: bool,
}

#[async_trait]
impl SpeechProvider for FakeSpeech {
    fn name(&self) -> &'static str {
        "fake-speech"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn synthesize(&self, text: &str, _voice: VoiceGender) -> ProviderResult<Vec<u8>> {
        if self.fail {
            return Err(ProviderError::RequestFailed {
                provider: "fake-speech",
                status: 503,
                body: "speech service unavailable".to_string(),
            });
        }
        Ok(text.as_bytes().to_vec())
    }
}

struct BrokenImages;

#[async_trait]
impl ImageProvider for BrokenImages {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_or_generate(&self, _query: &ImageQuery) -> ProviderResult<Vec<u8>> {
        Err(ProviderError::Exhausted("broken"))
    }
}

/// Writes a stub file for every command and remembers the output names.
#[derive(Default)]
struct FakeRunner {
    outputs: Mutex<Vec<String>>,
}

impl FakeRunner {
    fn outputs(&self) -> Vec<String> {
        self.outputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let output = cmd.output_path();
        tokio::fs::write(output, b"fake media").await?;
        let name = output.file_name().unwrap().to_string_lossy().to_string();
        self.outputs.lock().unwrap().push(name);
        Ok(())
    }

    async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
        Ok(24.0)
    }
}

/// Job store that records every accepted update.
#[derive(Default)]
struct RecordingStore {
    inner: InMemoryJobStore,
    updates: Mutex<Vec<(JobStage, u8)>>,
}

#[async_trait]
impl JobStore for RecordingStore {
    async fn create(&self) -> StoreResult<Job> {
        self.inner.create().await
    }

    async fn put(&self, job: Job) -> StoreResult<()> {
        self.inner.put(job).await
    }

    async fn get(&self, job_id: &JobId) -> StoreResult<Job> {
        self.inner.get(job_id).await
    }

    async fn update(&self, job_id: &JobId, update: JobUpdate) -> StoreResult<()> {
        let entry = (update.stage, update.progress);
        self.inner.update(job_id, update).await?;
        self.updates.lock().unwrap().push(entry);
        Ok(())
    }

    async fn fail(&self, job_id: &JobId, error: &str) -> StoreResult<()> {
        self.inner.fail(job_id, error).await
    }

    async fn remove(&self, job_id: &JobId) -> StoreResult<Option<Job>> {
        self.inner.remove(job_id).await
    }

    async fn count(&self) -> usize {
        self.inner.count().await
    }
}

struct Harness {
    _dir: TempDir,
    config: WorkerConfig,
    store: Arc<RecordingStore>,
    runner: Arc<FakeRunner>,
    executor: JobExecutor,
}

impl Harness {
    fn new(providers: ProviderSet, stage_timeout: Duration) -> Self {
        Self::with_config(providers, |config| config.stage_timeout = stage_timeout)
    }

    fn with_config(providers: ProviderSet, tweak: impl FnOnce(&mut WorkerConfig)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = WorkerConfig::rooted_at(dir.path());
        tweak(&mut config);
        let store = Arc::new(RecordingStore::default());
        let runner = Arc::new(FakeRunner::default());
        let pipeline = Arc::new(ReelPipeline::new(
            config.clone(),
            store.clone(),
            providers,
            runner.clone(),
        ));
        let executor = JobExecutor::new(store.clone(), pipeline);
        Self {
            _dir: dir,
            config,
            store,
            runner,
            executor,
        }
    }

    fn work_dir(&self, job_id: &JobId) -> std::path::PathBuf {
        self.config.temp_dir.join(job_id.as_str())
    }

    async fn wait_status(&self, job_id: &JobId, status: JobStage) {
        for _ in 0..3000 {
            if self.store.get(job_id).await.unwrap().status == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never reached {}", job_id, status);
    }

    async fn wait_terminal(&self, job_id: &JobId) -> Job {
        for _ in 0..3000 {
            let job = self.store.get(job_id).await.unwrap();
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }
}

fn providers(speech_fails: bool, images: ImageChain) -> ProviderSet {
    ProviderSet {
        script: Arc::new(FakeScript {
            delay: Duration::ZERO,
        }),
        speech: SpeechChain::new(vec![Arc::new(FakeSpeech { fail: speech_fails })]),
        images,
    }
}

fn placeholder_images() -> ImageChain {
    ImageChain::new(vec![Arc::new(PlaceholderImageProvider)])
}

fn test_request() -> ReelRequest {
    let mut request = ReelRequest::new("test");
    request.duration_seconds = 24;
    request.add_subtitles = true;
    request.music = MusicGenre::None;
    request.style = VideoStyle::Minimal;
    request
}

#[tokio::test]
async fn test_job_completes_and_delete_removes_artifacts() {
    let harness = Harness::new(providers(false, placeholder_images()), Duration::from_secs(30));

    let response = harness.executor.submit(test_request()).await.unwrap();
    assert_eq!(response.estimated_time_seconds, 96);

    let job = harness.wait_terminal(&response.job_id).await;
    assert_eq!(job.status, JobStage::Completed);
    assert_eq!(job.progress, 100);
    assert_eq!(
        job.download_url.as_deref(),
        Some(format!("/api/download/{}", response.job_id).as_str())
    );
    assert_eq!(job.script.as_ref().map(|s| s.scenes.len()), Some(3));

    let output = harness
        .config
        .output_dir
        .join(format!("{}.mp4", response.job_id));
    assert!(output.exists());
    assert_eq!(job.output_path.as_deref(), Some(output.as_path()));

    assert_eq!(
        harness.runner.outputs(),
        vec![
            "narration.mp3",
            "raw_video.mp4",
            "with_audio.mp4",
            "with_subs.mp4",
            "final.mp4"
        ]
    );

    harness.executor.delete(&response.job_id).await.unwrap();
    assert!(!output.exists());
    assert!(!harness.config.temp_dir.join(response.job_id.as_str()).exists());
    assert!(harness.store.get(&response.job_id).await.is_err());
}

#[tokio::test]
async fn test_progress_checkpoints_are_monotonic() {
    let harness = Harness::new(providers(false, placeholder_images()), Duration::from_secs(30));
    let response = harness.executor.submit(test_request()).await.unwrap();
    harness.wait_terminal(&response.job_id).await;

    let updates = harness.store.updates.lock().unwrap().clone();
    let progress: Vec<u8> = updates.iter().map(|(_, p)| *p).collect();
    assert_eq!(progress, vec![10, 25, 30, 50, 55, 70, 75, 100]);
    assert!(updates.windows(2).all(|w| w[0].0.ordinal() <= w[1].0.ordinal()));
    assert_eq!(updates.last().map(|(s, _)| *s), Some(JobStage::Completed));
}

#[tokio::test]
async fn test_speech_failure_fails_job() {
    let harness = Harness::new(providers(true, placeholder_images()), Duration::from_secs(30));
    let response = harness.executor.submit(test_request()).await.unwrap();

    let job = harness.wait_terminal(&response.job_id).await;
    assert_eq!(job.status, JobStage::Failed);
    assert_eq!(job.progress, 0);
    assert!(job.error.unwrap().contains("speech service unavailable"));
    assert!(harness.runner.outputs().is_empty());
    assert!(job.download_url.is_none());
}

#[tokio::test]
async fn test_image_failure_falls_back_to_placeholder() {
    let images = ImageChain::new(vec![Arc::new(BrokenImages), Arc::new(PlaceholderImageProvider)]);
    let harness = Harness::new(providers(false, images), Duration::from_secs(30));
    let response = harness.executor.submit(test_request()).await.unwrap();

    let job = harness.wait_terminal(&response.job_id).await;
    assert_eq!(job.status, JobStage::Completed);

    let images_dir = harness
        .config
        .temp_dir
        .join(response.job_id.as_str())
        .join("images");
    for order in 1..=3 {
        let bytes = std::fs::read(images_dir.join(format!("scene_{:02}.png", order))).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}

#[tokio::test]
async fn test_narration_files_follow_scene_order() {
    let harness = Harness::new(providers(false, placeholder_images()), Duration::from_secs(30));
    let response = harness.executor.submit(test_request()).await.unwrap();
    harness.wait_terminal(&response.job_id).await;

    let audio_dir = harness
        .config
        .temp_dir
        .join(response.job_id.as_str())
        .join("audio");
    for order in 1..=3 {
        let text = std::fs::read_to_string(audio_dir.join(format!("scene_{:02}.mp3", order))).unwrap();
        assert_eq!(text, format!("narration for scene number {}", order));
    }
}

#[tokio::test]
async fn test_missing_music_asset_skips_mix() {
    let harness = Harness::new(providers(false, placeholder_images()), Duration::from_secs(30));
    let mut request = test_request();
    request.music = MusicGenre::Upbeat;
    request.add_subtitles = false;

    let response = harness.executor.submit(request).await.unwrap();
    let job = harness.wait_terminal(&response.job_id).await;
    assert_eq!(job.status, JobStage::Completed);
    assert_eq!(
        harness.runner.outputs(),
        vec!["narration.mp3", "raw_video.mp4", "with_audio.mp4", "final.mp4"]
    );
}

#[tokio::test]
async fn test_stage_timeout_fails_job() {
    let providers = ProviderSet {
        script: Arc::new(FakeScript {
            delay: Duration::from_secs(5),
        }),
        speech: SpeechChain::new(vec![Arc::new(FakeSpeech { fail: false })]),
        images: placeholder_images(),
    };
    let harness = Harness::new(providers, Duration::from_millis(50));
    let response = harness.executor.submit(test_request()).await.unwrap();

    let job = harness.wait_terminal(&response.job_id).await;
    assert_eq!(job.status, JobStage::Failed);
    assert!(job.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_delete_unknown_job_is_not_found() {
    let harness = Harness::new(providers(false, placeholder_images()), Duration::from_secs(30));
    let err = harness
        .executor
        .delete(&JobId::from_string("missing"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

fn slow_failing_providers() -> ProviderSet {
    ProviderSet {
        script: Arc::new(FakeScript {
            delay: Duration::from_millis(300),
        }),
        speech: SpeechChain::new(vec![Arc::new(FakeSpeech { fail: true })]),
        images: placeholder_images(),
    }
}

#[tokio::test]
async fn test_deleting_pending_job_skips_its_run() {
    let harness = Harness::with_config(slow_failing_providers(), |config| {
        config.max_concurrent_jobs = 1;
    });

    let first = harness.executor.submit(test_request()).await.unwrap();
    let queued = harness.executor.submit(test_request()).await.unwrap();
    let last = harness.executor.submit(test_request()).await.unwrap();

    assert_eq!(
        harness.store.get(&queued.job_id).await.unwrap().status,
        JobStage::Pending
    );
    harness.executor.delete(&queued.job_id).await.unwrap();

    // Slots are handed out in submission order, so the deleted job's turn
    // is over once the last job finishes.
    assert_eq!(harness.wait_terminal(&first.job_id).await.status, JobStage::Failed);
    assert_eq!(harness.wait_terminal(&last.job_id).await.status, JobStage::Failed);

    assert!(!harness.work_dir(&queued.job_id).exists());
    assert!(harness.store.get(&queued.job_id).await.is_err());
    assert_eq!(harness.store.count().await, 2);
}

#[tokio::test]
async fn test_deleting_running_job_cleans_up_after_failure() {
    let harness = Harness::with_config(slow_failing_providers(), |config| {
        config.max_concurrent_jobs = 1;
    });

    let running = harness.executor.submit(test_request()).await.unwrap();
    harness
        .wait_status(&running.job_id, JobStage::GeneratingScript)
        .await;
    let after = harness.executor.submit(test_request()).await.unwrap();

    harness.executor.delete(&running.job_id).await.unwrap();
    assert!(!harness.work_dir(&running.job_id).exists());

    assert_eq!(harness.wait_terminal(&after.job_id).await.status, JobStage::Failed);
    assert!(!harness.work_dir(&running.job_id).exists());
    assert!(harness.store.get(&running.job_id).await.is_err());
}

#[tokio::test]
async fn test_submit_after_close_fails_job() {
    let harness = Harness::new(providers(false, placeholder_images()), Duration::from_secs(30));
    harness.executor.close();

    let response = harness.executor.submit(test_request()).await.unwrap();
    let job = harness.wait_terminal(&response.job_id).await;
    assert_eq!(job.status, JobStage::Failed);
    assert_eq!(job.error.as_deref(), Some("Executor is shut down"));
    assert!(harness.runner.outputs().is_empty());
}
