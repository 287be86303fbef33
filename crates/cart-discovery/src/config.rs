//! Discovery configuration
//!
//! Both providers are optional. Without Google credentials, discovery
//! serves mock results; without an OpenRouter key, no AI call is made.

use crate::error::DiscoveryError;
use std::env;
use std::time::Duration;

pub const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "anthropic/claude-3-haiku";

/// Search and AI provider settings
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub google_search_url: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub request_timeout: Duration,
}

impl DiscoveryConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `GOOGLE_API_KEY` and `GOOGLE_SEARCH_ENGINE_ID` (both needed for live search)
    /// - `OPENROUTER_API_KEY`
    /// - `OPENROUTER_MODEL` (default: anthropic/claude-3-haiku)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            google_api_key: get("GOOGLE_API_KEY"),
            google_search_engine_id: get("GOOGLE_SEARCH_ENGINE_ID"),
            google_search_url: GOOGLE_SEARCH_URL.to_string(),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_model: get("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            openrouter_base_url: OPENROUTER_API_BASE.to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }

    /// Mock-only configuration (for testing)
    pub fn offline() -> Self {
        Self::from_vars(|_| None)
    }

    /// Google key and engine id, when both are set
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        match (&self.google_api_key, &self.google_search_engine_id) {
            (Some(key), Some(cx)) => Some((key.as_str(), cx.as_str())),
            _ => None,
        }
    }

    /// Builder: override the Google endpoint (for testing)
    pub fn with_google_search_url(mut self, url: impl Into<String>) -> Self {
        self.google_search_url = url.into();
        self
    }

    /// Builder: override the OpenRouter base URL (for testing)
    pub fn with_openrouter_base_url(mut self, url: impl Into<String>) -> Self {
        self.openrouter_base_url = url.into();
        self
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, DiscoveryError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| DiscoveryError::Configuration(format!("HTTP client: {}", e)))
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::offline()
    }
}
