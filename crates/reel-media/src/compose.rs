//! Reel composition: from per-scene images and narration to a delivery MP4.
//!
//! The builders in this module only construct [`FfmpegCommand`]s. The
//! [`VideoComposer`] chains them through a [`CommandRunner`], feeding each
//! step's output file into the next step.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

use reel_models::encoding::{EncodingConfig, OUTPUT_FPS, PIXEL_FORMAT};
use reel_models::{CaptionChunk, MusicGenre};

use crate::captions::render_srt;
use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::{
    delivery_scale_pad_filter, slideshow_filter, subtitle_filter, MIXED_AUDIO_LABEL,
    MUSIC_MIX_FILTER, SLIDESHOW_LABEL,
};
use crate::fs_utils::move_file;
use crate::runner::CommandRunner;

/// Intermediate artifact names inside the job working directory.
pub mod artifacts {
    pub const NARRATION_LIST: &str = "narration_list.txt";
    pub const NARRATION: &str = "narration.mp3";
    pub const RAW_VIDEO: &str = "raw_video.mp4";
    pub const WITH_AUDIO: &str = "with_audio.mp4";
    pub const SUBTITLES: &str = "subtitles.srt";
    pub const WITH_SUBS: &str = "with_subs.mp4";
    pub const WITH_MUSIC: &str = "with_music.mp4";
    pub const FINAL: &str = "final.mp4";
}

/// Everything needed to compose one reel.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Job working directory for intermediate artifacts
    pub work_dir: PathBuf,
    /// Where the finished reel is promoted to
    pub output_path: PathBuf,
    /// Scene images in scene order
    pub image_paths: Vec<PathBuf>,
    /// Scene narration clips in scene order
    pub audio_paths: Vec<PathBuf>,
    /// Script-declared scene durations
    pub scene_durations: Vec<f64>,
    pub add_subtitles: bool,
    pub captions: Vec<CaptionChunk>,
    pub music: MusicGenre,
}

/// Contents of an ffmpeg concat-demuxer list file.
pub fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'", p.to_string_lossy().replace('\'', "'\\''")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-image durations for the slideshow.
///
/// Uses the scene durations when there is one per image, otherwise splits
/// `total_duration` evenly.
pub fn resolve_durations(image_count: usize, scene_durations: &[f64], total_duration: f64) -> Vec<f64> {
    if scene_durations.len() == image_count {
        scene_durations.to_vec()
    } else {
        vec![total_duration / image_count as f64; image_count]
    }
}

/// Join narration clips with stream copy.
pub fn concat_audio_command(list: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input_with(list, ["-f", "concat", "-safe", "0"])
        .stream_copy()
}

/// Ken Burns slideshow of still images.
pub fn slideshow_command(
    images: &[PathBuf],
    durations: &[f64],
    output: &Path,
) -> MediaResult<FfmpegCommand> {
    if images.is_empty() {
        return Err(MediaError::invalid_input("slideshow needs at least one image"));
    }
    if images.len() != durations.len() {
        return Err(MediaError::invalid_input(format!(
            "{} images but {} durations",
            images.len(),
            durations.len()
        )));
    }

    // Durations use the shortest round-trip form, always with a fraction ("8.0").
    let cmd = images
        .iter()
        .zip(durations)
        .fold(FfmpegCommand::new(output), |cmd, (image, d)| {
            cmd.input_with(image, ["-loop".to_string(), "1".to_string(), "-t".to_string(), format!("{:?}", d)])
        });

    Ok(cmd
        .filter_complex(slideshow_filter(durations))
        .map(SLIDESHOW_LABEL)
        .output_args(EncodingConfig::slideshow().video_args())
        .pixel_format(PIXEL_FORMAT))
}

/// Attach narration, copying video and truncating to the shorter stream.
pub fn mux_command(video: &Path, audio: &Path, output: &Path) -> FfmpegCommand {
    let enc = EncodingConfig::default();
    FfmpegCommand::new(output)
        .input(video)
        .input(audio)
        .video_codec("copy")
        .audio_codec(enc.audio_codec)
        .audio_bitrate(enc.audio_bitrate)
        .shortest()
}

/// Burn captions into the video, copying audio.
pub fn subtitle_command(video: &Path, srt: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(video)
        .video_filter(subtitle_filter(srt))
        .audio_codec("copy")
        .output_args(EncodingConfig::subtitle_burn().video_args())
}

/// Loop a music bed under the narration.
pub fn music_mix_command(video: &Path, music: &Path, output: &Path) -> FfmpegCommand {
    let enc = EncodingConfig::default();
    FfmpegCommand::new(output)
        .input(video)
        .input_with(music, ["-stream_loop", "-1"])
        .filter_complex(MUSIC_MIX_FILTER)
        .map("0:v")
        .map(MIXED_AUDIO_LABEL)
        .video_codec("copy")
        .audio_codec(enc.audio_codec)
        .audio_bitrate(enc.audio_bitrate)
        .shortest()
}

/// Re-encode to the delivery profile.
pub fn export_command(video: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(output)
        .input(video)
        .output_args(EncodingConfig::delivery().to_ffmpeg_args())
        .video_filter(delivery_scale_pad_filter())
        .output_args(["-r".to_string(), OUTPUT_FPS.to_string()])
        .pixel_format(PIXEL_FORMAT)
}

/// Drives the encode steps for a reel.
#[derive(Clone)]
pub struct VideoComposer {
    runner: Arc<dyn CommandRunner>,
    music_dir: PathBuf,
}

impl VideoComposer {
    pub fn new(runner: Arc<dyn CommandRunner>, music_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            music_dir: music_dir.into(),
        }
    }

    /// Path of the asset for a music selection, if any.
    pub fn music_path(&self, music: MusicGenre) -> Option<PathBuf> {
        music.asset_file().map(|f| self.music_dir.join(f))
    }

    async fn run_step(&self, step: &'static str, cmd: FfmpegCommand) -> MediaResult<PathBuf> {
        let started = Instant::now();
        debug!(step, "running encode step");
        self.runner.run(&cmd).await?;
        metrics::histogram!("reel_ffmpeg_step_duration_seconds", "step" => step)
            .record(started.elapsed().as_secs_f64());
        Ok(cmd.output_path().to_path_buf())
    }

    /// Run every step and promote the result to `request.output_path`.
    pub async fn compose(&self, request: &ComposeRequest) -> MediaResult<PathBuf> {
        if request.image_paths.is_empty() {
            return Err(MediaError::invalid_input("no scene images to compose"));
        }
        if request.audio_paths.is_empty() {
            return Err(MediaError::invalid_input("no narration clips to compose"));
        }

        let work = request.work_dir.as_path();
        fs::create_dir_all(work).await?;

        // Narration
        let list = work.join(artifacts::NARRATION_LIST);
        fs::write(&list, concat_list(&request.audio_paths)).await?;
        let narration = self
            .run_step("concat_audio", concat_audio_command(&list, &work.join(artifacts::NARRATION)))
            .await?;

        let total_duration = self.runner.probe_duration(&narration).await?;
        info!(total_duration, scenes = request.image_paths.len(), "narration ready");

        // Slideshow
        let durations = resolve_durations(
            request.image_paths.len(),
            &request.scene_durations,
            total_duration,
        );
        let raw = self
            .run_step(
                "slideshow",
                slideshow_command(&request.image_paths, &durations, &work.join(artifacts::RAW_VIDEO))?,
            )
            .await?;

        let mut current = self
            .run_step("mux", mux_command(&raw, &narration, &work.join(artifacts::WITH_AUDIO)))
            .await?;

        if request.add_subtitles && !request.captions.is_empty() {
            let srt = work.join(artifacts::SUBTITLES);
            fs::write(&srt, render_srt(&request.captions)).await?;
            current = self
                .run_step(
                    "subtitles",
                    subtitle_command(&current, &srt, &work.join(artifacts::WITH_SUBS)),
                )
                .await?;
        }

        if let Some(music) = self.music_path(request.music) {
            let with_music = work.join(artifacts::WITH_MUSIC);
            if music.exists() {
                current = self
                    .run_step("music", music_mix_command(&current, &music, &with_music))
                    .await?;
            } else {
                warn!(music = %music.display(), "music asset missing, skipping mix");
                fs::copy(&current, &with_music).await?;
                current = with_music;
            }
        }

        let final_path = self
            .run_step("export", export_command(&current, &work.join(artifacts::FINAL)))
            .await?;

        move_file(&final_path, &request.output_path).await?;
        info!(output = %request.output_path.display(), "reel composed");

        Ok(request.output_path.clone())
    }
}
