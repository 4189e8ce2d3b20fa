//! Script generation through an OpenAI-compatible chat completions API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, info};

use reel_models::script::{scene_count_for, DEFAULT_TRANSITION};
use reel_models::{ReelRequest, Scene, Script, VideoStyle};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, check_status};

const PROVIDER: &str = "openai-chat";

const SYSTEM_PROMPT: &str =
    "You are an expert viral content creator. You always answer with valid JSON and nothing else.";

/// Inputs for script generation.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    pub topic: String,
    pub language: String,
    pub language_name: &'static str,
    pub duration_seconds: u32,
    pub style: VideoStyle,
}

impl From<&ReelRequest> for ScriptRequest {
    fn from(req: &ReelRequest) -> Self {
        Self {
            topic: req.topic.clone(),
            language: req.language.clone(),
            language_name: req.language_name(),
            duration_seconds: req.duration_seconds,
            style: req.style,
        }
    }
}

/// Produces a script for a topic. Failures are fatal for the job.
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &ScriptRequest) -> ProviderResult<Script>;
}

/// User prompt asking for a JSON script.
pub fn build_prompt(request: &ScriptRequest) -> String {
    let scenes = scene_count_for(request.duration_seconds);
    format!(
        r##"You are an expert in viral content marketing for Instagram Reels and TikTok.

Write a complete script for a reel about: "{topic}"

REQUIREMENTS:
- Language: {lang}
- Total duration: ~{dur} seconds
- Number of scenes: {scenes}
- Style: {style}
- The hook must grab attention within the first 3 seconds
- Close, direct and energetic language
- Optimised for retention and shares

Answer ONLY with valid JSON following exactly this structure:
{{
  "title": "Short reel title",
  "hook": "Very punchy opening line (max 10 words)",
  "scenes": [
    {{
      "order": 1,
      "text": "Text narrated aloud in this scene",
      "visual_prompt": "Detailed English description of the image for this scene, photographic/cinematic style",
      "duration": 8.0,
      "transition": "fade"
    }}
  ],
  "call_to_action": "Closing call to action",
  "hashtags": ["#hashtag1", "#hashtag2", "#hashtag3", "#hashtag4", "#hashtag5"],
  "total_duration": {dur}.0
}}

RULES FOR visual_prompt: always in English, cinematic style, include lighting and composition.
RULES FOR text: in {lang}, natural and spoken, no symbols that are hard to pronounce."##,
        topic = request.topic,
        lang = request.language_name,
        dur = request.duration_seconds,
        scenes = scenes,
        style = request.style,
    )
}

#[derive(Debug, Deserialize)]
struct RawScene {
    order: u32,
    text: String,
    visual_prompt: String,
    duration: Option<f64>,
    transition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawScript {
    title: String,
    hook: String,
    scenes: Vec<RawScene>,
    call_to_action: String,
    #[serde(default)]
    hashtags: Vec<String>,
    total_duration: Option<f64>,
}

/// Parse the model's JSON into a validated script.
///
/// Missing durations and transitions get defaults, scenes are sorted by
/// `order`, and orders must then run 1..=n.
pub fn parse_script_json(raw: &str, duration_seconds: u32) -> ProviderResult<Script> {
    let parsed: RawScript = serde_json::from_str(raw)
        .map_err(|e| ProviderError::invalid_response(PROVIDER, format!("malformed script JSON: {}", e)))?;

    let default_duration = duration_seconds as f64 / scene_count_for(duration_seconds) as f64;

    let mut scenes: Vec<Scene> = parsed
        .scenes
        .into_iter()
        .map(|s| Scene {
            order: s.order,
            narration_text: s.text,
            visual_description: s.visual_prompt,
            duration_seconds: s
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(default_duration),
            transition_kind: s
                .transition
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TRANSITION.to_string()),
        })
        .collect();
    scenes.sort_by_key(|s| s.order);

    let mut seen = HashSet::new();
    let hashtags = parsed
        .hashtags
        .into_iter()
        .filter(|h| seen.insert(h.clone()))
        .collect();

    let script = Script {
        title: parsed.title,
        hook: parsed.hook,
        scenes,
        call_to_action: parsed.call_to_action,
        hashtags,
        total_duration: parsed
            .total_duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(duration_seconds as f64),
    };

    script
        .validate()
        .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;
    Ok(script)
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Script provider backed by OpenAI chat completions.
pub struct OpenAiScriptProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiScriptProvider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(config.timeout)?,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.script_model.clone(),
        })
    }
}

#[async_trait]
impl ScriptProvider for OpenAiScriptProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, request: &ScriptRequest) -> ProviderResult<Script> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(PROVIDER))?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(topic = %request.topic, language = %request.language, "requesting script");

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(request)},
            ],
            "temperature": 0.8,
            "response_format": {"type": "json_object"},
        });

        let response = self.http.post(&url).bearer_auth(api_key).json(&body).send().await?;
        let chat: ChatResponse = check_status(response, PROVIDER).await?.json().await?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::invalid_response(PROVIDER, "no message content"))?;

        let script = parse_script_json(&content, request.duration_seconds)?;
        info!(title = %script.title, scenes = script.scenes.len(), "script generated");
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SCRIPT_JSON: &str = r##"{
        "title": "Coffee",
        "hook": "You drink it wrong",
        "scenes": [
            {"order": 2, "text": "second", "visual_prompt": "beans", "duration": 9},
            {"order": 1, "text": "first", "visual_prompt": "cup", "transition": "cut"},
            {"order": 3, "text": "third", "visual_prompt": "barista", "duration": 0}
        ],
        "call_to_action": "Follow",
        "hashtags": ["#coffee", "#coffee", "#morning"]
    }"##;

    #[test]
    fn test_parse_applies_defaults_and_sorts() {
        let script = parse_script_json(SCRIPT_JSON, 30).unwrap();
        let orders: Vec<u32> = script.scenes.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(script.scenes[0].duration_seconds, 10.0);
        assert_eq!(script.scenes[0].transition_kind, "cut");
        assert_eq!(script.scenes[1].duration_seconds, 9.0);
        assert_eq!(script.scenes[1].transition_kind, "fade");
        assert_eq!(script.scenes[2].duration_seconds, 10.0);
        assert_eq!(script.hashtags, vec!["#coffee", "#morning"]);
        assert_eq!(script.total_duration, 30.0);
    }

    #[test]
    fn test_parse_rejects_gaps_and_garbage() {
        let gap = r#"{"title":"t","hook":"h","call_to_action":"c",
            "scenes":[{"order":1,"text":"a","visual_prompt":"v"},{"order":3,"text":"b","visual_prompt":"v"}]}"#;
        assert!(matches!(
            parse_script_json(gap, 30),
            Err(ProviderError::InvalidResponse { .. })
        ));
        assert!(parse_script_json("not json", 30).is_err());
        let empty = r#"{"title":"t","hook":"h","call_to_action":"c","scenes":[]}"#;
        assert!(parse_script_json(empty, 30).is_err());
    }

    #[test]
    fn test_prompt_mentions_scene_count() {
        let mut req = ReelRequest::new("coffee facts");
        req.duration_seconds = 40;
        let prompt = build_prompt(&ScriptRequest::from(&req));
        assert!(prompt.contains("Number of scenes: 5"));
        assert!(prompt.contains("Language: Spanish"));
        assert!(prompt.contains("\"coffee facts\""));
    }

    #[tokio::test]
    async fn test_generate_against_mock() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": SCRIPT_JSON}}]
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let config = ProviderConfig {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: server.uri(),
            ..Default::default()
        };
        let provider = OpenAiScriptProvider::new(&config).unwrap();
        let script = provider
            .generate(&ScriptRequest::from(&ReelRequest::new("coffee")))
            .await
            .unwrap();
        assert_eq!(script.scenes.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let config = ProviderConfig {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: server.uri(),
            ..Default::default()
        };
        let provider = OpenAiScriptProvider::new(&config).unwrap();
        let err = provider
            .generate(&ScriptRequest::from(&ReelRequest::new("coffee")))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_generate_without_key() {
        let provider = OpenAiScriptProvider::new(&ProviderConfig::default()).unwrap();
        let err = provider
            .generate(&ScriptRequest::from(&ReelRequest::new("coffee")))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
