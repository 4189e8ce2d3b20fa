//! Video encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical output width
pub const OUTPUT_WIDTH: u32 = 1080;
/// Canonical output height
pub const OUTPUT_HEIGHT: u32 = 1920;
/// Canonical output frame rate
pub const OUTPUT_FPS: u32 = 30;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF for intermediate encodes
pub const DEFAULT_CRF: u8 = 23;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";
/// Delivery audio sample rate
pub const DELIVERY_SAMPLE_RATE: u32 = 44100;
/// Pixel format accepted by every player
pub const PIXEL_FORMAT: &str = "yuv420p";

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// H.264 profile and level, when pinned
    #[serde(default)]
    pub profile: Option<(String, String)>,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Audio sample rate, when resampling
    #[serde(default)]
    pub sample_rate: Option<u32>,

    /// Move the moov atom to the front for progressive playback
    #[serde(default)]
    pub faststart: bool,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            profile: None,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            sample_rate: None,
            faststart: false,
        }
    }
}

impl EncodingConfig {
    /// Slideshow assembly encode.
    pub fn slideshow() -> Self {
        Self::default()
    }

    /// Subtitle burn-in encode.
    pub fn subtitle_burn() -> Self {
        Self::default().with_crf(22)
    }

    /// Final delivery profile.
    pub fn delivery() -> Self {
        Self {
            preset: "slow".to_string(),
            crf: 20,
            profile: Some(("high".to_string(), "4.0".to_string())),
            sample_rate: Some(DELIVERY_SAMPLE_RATE),
            faststart: true,
            ..Default::default()
        }
    }

    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Video codec arguments.
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
        ];
        if let Some((profile, level)) = &self.profile {
            args.extend_from_slice(&[
                "-profile:v".to_string(),
                profile.clone(),
                "-level".to_string(),
                level.clone(),
            ]);
        }
        args
    }

    /// Audio codec arguments.
    pub fn audio_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ];
        if let Some(rate) = self.sample_rate {
            args.extend_from_slice(&["-ar".to_string(), rate.to_string()]);
        }
        args
    }

    /// Video, audio and container arguments in delivery order.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = self.video_args();
        args.extend(self.audio_args());
        if self.faststart {
            args.extend_from_slice(&["-movflags".to_string(), "+faststart".to_string()]);
        }
        args
    }
}
