//! Capability providers for reel generation.
//!
//! Three roles, each behind an async trait:
//! - [`ScriptProvider`]: topic to structured script, no fallback
//! - [`SpeechProvider`]: narration audio, ranked in a [`SpeechChain`]
//! - [`ImageProvider`]: scene imagery, ranked in an [`ImageChain`] ending in a
//!   placeholder that cannot fail

use std::sync::Arc;

pub mod config;
pub mod error;
mod http;
pub mod images;
pub mod script;
pub mod speech;

pub use config::ProviderConfig;
pub use error::{ProviderError, ProviderResult};
pub use images::{
    enhance_prompt, extract_keywords, ImageChain, ImageProvider, ImageQuery, OpenAiImageProvider,
    PexelsImageProvider, PlaceholderImageProvider, SceneImage,
};
pub use script::{parse_script_json, OpenAiScriptProvider, ScriptProvider, ScriptRequest};
pub use speech::{ElevenLabsSpeech, OpenAiSpeech, SpeechChain, SpeechProvider, SynthesizedAudio};

/// The providers one pipeline run needs.
#[derive(Clone)]
pub struct ProviderSet {
    pub script: Arc<dyn ScriptProvider>,
    pub speech: SpeechChain,
    pub images: ImageChain,
}

impl ProviderSet {
    /// Build the default HTTP-backed providers.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            script: Arc::new(OpenAiScriptProvider::new(config)?),
            speech: SpeechChain::from_config(config)?,
            images: ImageChain::from_config(config)?,
        })
    }
}
