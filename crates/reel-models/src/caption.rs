//! Time-coded caption chunks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A caption shown between `start_seconds` and `end_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionChunk {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl CaptionChunk {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}
