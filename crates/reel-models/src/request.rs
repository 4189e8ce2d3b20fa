//! Submission request and response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{JobId, MusicGenre, VideoStyle, VoiceGender};

/// Estimated processing seconds per second of target duration.
pub const ESTIMATE_SECONDS_PER_TARGET_SECOND: u32 = 4;

/// A request to generate a reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ReelRequest {
    /// Topic of the reel
    #[validate(length(min = 3, max = 500))]
    pub topic: String,

    /// Narration language code
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub style: VideoStyle,

    #[serde(default)]
    pub voice_gender: VoiceGender,

    #[serde(default)]
    pub music: MusicGenre,

    /// Target duration in seconds
    #[serde(default = "default_duration")]
    #[validate(range(min = 15, max = 60))]
    pub duration_seconds: u32,

    #[serde(default = "default_subtitles")]
    pub add_subtitles: bool,
}

fn default_language() -> String {
    "es".to_string()
}

fn default_duration() -> u32 {
    30
}

fn default_subtitles() -> bool {
    true
}

impl ReelRequest {
    /// Request with defaults for everything but the topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            language: default_language(),
            style: VideoStyle::default(),
            voice_gender: VoiceGender::default(),
            music: MusicGenre::default(),
            duration_seconds: default_duration(),
            add_subtitles: default_subtitles(),
        }
    }

    /// Human-readable language name used in script prompts.
    pub fn language_name(&self) -> &'static str {
        if self.language == "es" {
            "Spanish"
        } else {
            "English"
        }
    }

    pub fn estimated_time_seconds(&self) -> u32 {
        self.duration_seconds * ESTIMATE_SECONDS_PER_TARGET_SECOND
    }
}

/// Response to an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReelResponse {
    pub job_id: JobId,
    pub message: String,
    pub estimated_time_seconds: u32,
}
