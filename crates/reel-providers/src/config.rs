//! Provider credentials and endpoints.

use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_PEXELS_BASE_URL: &str = "https://api.pexels.com";
pub const DEFAULT_SCRIPT_MODEL: &str = "gpt-4o";

/// Configuration for every upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub script_model: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    pub pexels_api_key: Option<String>,
    pub pexels_base_url: String,
    /// Timeout for generation calls
    pub timeout: Duration,
    /// Timeout for stock photo lookups
    pub stock_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            script_model: DEFAULT_SCRIPT_MODEL.to_string(),
            elevenlabs_api_key: None,
            elevenlabs_base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            pexels_api_key: None,
            pexels_base_url: DEFAULT_PEXELS_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            stock_timeout: Duration::from_secs(30),
        }
    }
}

/// Non-empty environment variable.
fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ProviderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: env_key("OPENAI_API_KEY"),
            openai_base_url: env_key("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            script_model: env_key("OPENAI_SCRIPT_MODEL").unwrap_or(defaults.script_model),
            elevenlabs_api_key: env_key("ELEVENLABS_API_KEY"),
            elevenlabs_base_url: env_key("ELEVENLABS_BASE_URL")
                .unwrap_or(defaults.elevenlabs_base_url),
            pexels_api_key: env_key("PEXELS_API_KEY"),
            pexels_base_url: env_key("PEXELS_BASE_URL").unwrap_or(defaults.pexels_base_url),
            timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            stock_timeout: Duration::from_secs(
                std::env::var("STOCK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    pub fn has_openai(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn has_elevenlabs(&self) -> bool {
        self.elevenlabs_api_key.is_some()
    }

    pub fn has_pexels(&self) -> bool {
        self.pexels_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.openai_base_url, "https://api.openai.com");
        assert_eq!(config.script_model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.stock_timeout, Duration::from_secs(30));
        assert!(!config.has_openai());
        assert!(!config.has_elevenlabs());
        assert!(!config.has_pexels());
    }
}
