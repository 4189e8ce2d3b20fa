//! Text-to-speech providers and the ranked speech chain.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use reel_models::VoiceGender;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, read_bytes};

/// Synthesizes narration audio (MP3 bytes).
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool;

    async fn synthesize(&self, text: &str, voice: VoiceGender) -> ProviderResult<Vec<u8>>;
}

/// Audio produced by a chain, tagged with the provider that made it.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub provider: &'static str,
}

/// ElevenLabs multilingual voices.
pub struct ElevenLabsSpeech {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl ElevenLabsSpeech {
    const NAME: &'static str = "elevenlabs";

    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            api_key: config.elevenlabs_api_key.clone(),
            base_url: config.elevenlabs_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn voice_id(voice: VoiceGender) -> &'static str {
        match voice {
            VoiceGender::Female => "21m00Tcm4TlvDq8ikWAM",
            VoiceGender::Male => "AZnzlk1XvdvUeBnXmlld",
        }
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsSpeech {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str, voice: VoiceGender) -> ProviderResult<Vec<u8>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(Self::NAME))?;
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, Self::voice_id(voice));

        let body = json!({
            "text": text,
            "model_id": "eleven_multilingual_v2",
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.8,
                "style": 0.3,
                "use_speaker_boost": true,
            },
        });

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        read_bytes(response, Self::NAME).await
    }
}

/// OpenAI `tts-1-hd` voices.
pub struct OpenAiSpeech {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiSpeech {
    const NAME: &'static str = "openai-tts";

    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn voice_name(voice: VoiceGender) -> &'static str {
        match voice {
            VoiceGender::Female => "nova",
            VoiceGender::Male => "onyx",
        }
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeech {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str, voice: VoiceGender) -> ProviderResult<Vec<u8>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(Self::NAME))?;
        let url = format!("{}/v1/audio/speech", self.base_url);

        let body = json!({
            "model": "tts-1-hd",
            "voice": Self::voice_name(voice),
            "input": text,
            "speed": 1.05,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        read_bytes(response, Self::NAME).await
    }
}

/// Ranked list of speech providers.
///
/// Unconfigured providers are skipped. A failure falls through to the next
/// configured provider; the last configured provider's failure is returned.
#[derive(Clone)]
pub struct SpeechChain {
    providers: Vec<Arc<dyn SpeechProvider>>,
}

impl SpeechChain {
    pub fn new(providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        Self { providers }
    }

    /// ElevenLabs first, OpenAI as the fallback.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self::new(vec![
            Arc::new(ElevenLabsSpeech::new(config)?),
            Arc::new(OpenAiSpeech::new(config)?),
        ]))
    }

    pub async fn synthesize(&self, text: &str, voice: VoiceGender) -> ProviderResult<SynthesizedAudio> {
        let configured: Vec<&Arc<dyn SpeechProvider>> =
            self.providers.iter().filter(|p| p.is_configured()).collect();

        let mut last_error = None;
        for (rank, provider) in configured.iter().enumerate() {
            match provider.synthesize(text, voice).await {
                Ok(bytes) => {
                    debug!(provider = provider.name(), bytes = bytes.len(), "speech synthesized");
                    return Ok(SynthesizedAudio {
                        bytes,
                        provider: provider.name(),
                    });
                }
                Err(e) => {
                    if rank + 1 < configured.len() {
                        warn!(provider = provider.name(), error = %e, "speech provider failed, falling back");
                        metrics::counter!(
                            "reel_provider_fallbacks_total",
                            "role" => "speech",
                            "provider" => provider.name()
                        )
                        .increment(1);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ProviderError::NotConfigured("speech")))
    }
}
