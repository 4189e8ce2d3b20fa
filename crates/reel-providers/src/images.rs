//! Scene image providers and the three-tier image chain.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use reel_media::render_placeholder_png;
use reel_models::VideoStyle;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, check_status, download};

/// Longest prompt accepted by the image generation API.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Tokens considered when building a stock search query.
const KEYWORD_WINDOW: usize = 10;
/// Keywords kept in a stock search query.
const MAX_KEYWORDS: usize = 4;
const STOPWORDS: [&str; 10] = ["a", "an", "the", "of", "in", "on", "at", "for", "with", "and"];

/// What to draw for one scene.
#[derive(Debug, Clone)]
pub struct ImageQuery {
    pub visual_description: String,
    pub style: VideoStyle,
    pub scene_order: u32,
}

/// Image bytes tagged with the provider that produced them.
#[derive(Debug, Clone)]
pub struct SceneImage {
    pub bytes: Vec<u8>,
    pub provider: &'static str,
}

/// Fetches or generates a scene image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    async fn fetch_or_generate(&self, query: &ImageQuery) -> ProviderResult<Vec<u8>>;
}

/// Style-enriched prompt for image generation.
pub fn enhance_prompt(visual_description: &str, style: VideoStyle) -> String {
    let prompt = format!(
        "{}, {}, vertical composition 9:16 portrait format, high quality",
        visual_description,
        style.prompt_modifier()
    );
    prompt.chars().take(MAX_PROMPT_CHARS).collect()
}

/// Search keywords: the first few non-stopword tokens of a description.
pub fn extract_keywords(visual_description: &str) -> String {
    visual_description
        .split_whitespace()
        .take(KEYWORD_WINDOW)
        .filter(|w| !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .take(MAX_KEYWORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<GeneratedImage>,
}

/// DALL-E 3 image generation.
pub struct OpenAiImageProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiImageProvider {
    const NAME: &'static str = "dall-e";

    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_or_generate(&self, query: &ImageQuery) -> ProviderResult<Vec<u8>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(Self::NAME))?;
        let url = format!("{}/v1/images/generations", self.base_url);

        let body = json!({
            "model": "dall-e-3",
            "prompt": enhance_prompt(&query.visual_description, query.style),
            "size": "1024x1792",
            "quality": "hd",
            "n": 1,
            "style": "vivid",
        });

        let response = self.http.post(&url).bearer_auth(api_key).json(&body).send().await?;
        let generated: GenerationResponse = check_status(response, Self::NAME).await?.json().await?;

        let image_url = generated
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| ProviderError::invalid_response(Self::NAME, "no image url"))?;

        download(&self.http, &image_url, Self::NAME).await
    }
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    large2x: String,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsSrc,
}

#[derive(Debug, Deserialize)]
struct PexelsSearch {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

/// Pexels portrait stock photo search.
pub struct PexelsImageProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PexelsImageProvider {
    const NAME: &'static str = "pexels";

    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.stock_timeout)?,
            api_key: config.pexels_api_key.clone(),
            base_url: config.pexels_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageProvider for PexelsImageProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_or_generate(&self, query: &ImageQuery) -> ProviderResult<Vec<u8>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(Self::NAME))?;
        let keywords = extract_keywords(&query.visual_description);
        let url = format!("{}/v1/search", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", api_key)
            .query(&[
                ("query", keywords.as_str()),
                ("per_page", "1"),
                ("orientation", "portrait"),
            ])
            .send()
            .await?;
        let search: PexelsSearch = check_status(response, Self::NAME).await?.json().await?;

        let photo_url = search
            .photos
            .into_iter()
            .next()
            .map(|p| p.src.large2x)
            .ok_or_else(|| {
                ProviderError::invalid_response(Self::NAME, format!("no photos for '{}'", keywords))
            })?;

        download(&self.http, &photo_url, Self::NAME).await
    }
}

/// Local gradient placeholder. Always configured.
#[derive(Debug, Default)]
pub struct PlaceholderImageProvider;

#[async_trait]
impl ImageProvider for PlaceholderImageProvider {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_or_generate(&self, query: &ImageQuery) -> ProviderResult<Vec<u8>> {
        let order = query.scene_order;
        let bytes = tokio::task::spawn_blocking(move || render_placeholder_png(order))
            .await
            .map_err(|e| ProviderError::invalid_response("placeholder", e.to_string()))??;
        Ok(bytes)
    }
}

/// Ranked image providers. Every failure is logged and the next tier tried.
#[derive(Clone)]
pub struct ImageChain {
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ImageChain {
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self { providers }
    }

    /// AI generation, then stock search, then placeholder.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self::new(vec![
            Arc::new(OpenAiImageProvider::new(config)?),
            Arc::new(PexelsImageProvider::new(config)?),
            Arc::new(PlaceholderImageProvider),
        ]))
    }

    pub async fn fetch(&self, query: &ImageQuery) -> ProviderResult<SceneImage> {
        for provider in &self.providers {
            if !provider.is_configured() {
                debug!(provider = provider.name(), "image provider not configured, skipping");
                continue;
            }
            match provider.fetch_or_generate(query).await {
                Ok(bytes) => {
                    return Ok(SceneImage {
                        bytes,
                        provider: provider.name(),
                    })
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        scene = query.scene_order,
                        error = %e,
                        "image provider failed, trying next"
                    );
                    metrics::counter!(
                        "reel_provider_fallbacks_total",
                        "role" => "image",
                        "provider" => provider.name()
                    )
                    .increment(1);
                }
            }
        }
        Err(ProviderError::Exhausted("image"))
    }
}
