//! Shared data models for the reel generator.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, job stages and the stage transition rules
//! - Scripts, scenes and caption chunks
//! - Submission requests and responses
//! - Visual style, voice and music selections
//! - The fixed delivery encoding profile

pub mod caption;
pub mod encoding;
pub mod job;
pub mod request;
pub mod script;
pub mod style;

// Re-export common types
pub use caption::CaptionChunk;
pub use encoding::EncodingConfig;
pub use job::{Job, JobId, JobStage, JobUpdate, TransitionError};
pub use request::{ReelRequest, ReelResponse, ESTIMATE_SECONDS_PER_TARGET_SECOND};
pub use script::{scene_count_for, Scene, Script, ScriptError};
pub use style::{MusicGenre, StyleParseError, VideoStyle, VoiceGender};
