//! Visual style, voice and music selections.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown {kind}: {value}")]
pub struct StyleParseError {
    kind: &'static str,
    value: String,
}

impl StyleParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Visual style applied to scene imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStyle {
    Cinematic,
    #[default]
    Vibrant,
    Minimal,
    Dark,
}

impl VideoStyle {
    pub const ALL: &'static [VideoStyle] = &[
        VideoStyle::Cinematic,
        VideoStyle::Vibrant,
        VideoStyle::Minimal,
        VideoStyle::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStyle::Cinematic => "cinematic",
            VideoStyle::Vibrant => "vibrant",
            VideoStyle::Minimal => "minimal",
            VideoStyle::Dark => "dark",
        }
    }

    /// Prompt modifier appended to every image description.
    pub fn prompt_modifier(&self) -> &'static str {
        match self {
            VideoStyle::Cinematic => "cinematic photography, dramatic lighting, shallow depth of field, film grain, 8K ultra realistic",
            VideoStyle::Vibrant => "vibrant colors, bright lighting, modern aesthetic, Instagram-worthy, professional photography",
            VideoStyle::Minimal => "minimalist composition, clean background, subtle colors, modern design, editorial photography",
            VideoStyle::Dark => "dark moody aesthetic, contrast lighting, dramatic shadows, cinematic dark tones, premium feel",
        }
    }
}

impl fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cinematic" => Ok(VideoStyle::Cinematic),
            "vibrant" => Ok(VideoStyle::Vibrant),
            "minimal" => Ok(VideoStyle::Minimal),
            "dark" => Ok(VideoStyle::Dark),
            _ => Err(StyleParseError::new("style", s)),
        }
    }
}

/// Narrator voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    Male,
    #[default]
    Female,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Male => "male",
            VoiceGender::Female => "female",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceGender {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(VoiceGender::Male),
            "female" => Ok(VoiceGender::Female),
            _ => Err(StyleParseError::new("voice", s)),
        }
    }
}

/// Background music selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MusicGenre {
    None,
    #[default]
    Upbeat,
    Ambient,
    Dramatic,
    Motivational,
}

impl MusicGenre {
    pub const ALL: &'static [MusicGenre] = &[
        MusicGenre::None,
        MusicGenre::Upbeat,
        MusicGenre::Ambient,
        MusicGenre::Dramatic,
        MusicGenre::Motivational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MusicGenre::None => "none",
            MusicGenre::Upbeat => "upbeat",
            MusicGenre::Ambient => "ambient",
            MusicGenre::Dramatic => "dramatic",
            MusicGenre::Motivational => "motivational",
        }
    }

    /// Asset filename inside the music directory, or `None` for no music.
    pub fn asset_file(&self) -> Option<&'static str> {
        match self {
            MusicGenre::None => None,
            MusicGenre::Upbeat => Some("upbeat.mp3"),
            MusicGenre::Ambient => Some("ambient.mp3"),
            MusicGenre::Dramatic => Some("dramatic.mp3"),
            MusicGenre::Motivational => Some("motivational.mp3"),
        }
    }
}

impl fmt::Display for MusicGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MusicGenre {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(MusicGenre::None),
            "upbeat" => Ok(MusicGenre::Upbeat),
            "ambient" => Ok(MusicGenre::Ambient),
            "dramatic" => Ok(MusicGenre::Dramatic),
            "motivational" => Ok(MusicGenre::Motivational),
            _ => Err(StyleParseError::new("music", s)),
        }
    }
}
