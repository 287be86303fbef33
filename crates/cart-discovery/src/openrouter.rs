//! OpenRouter chat-completion client
//!
//! Asks a hosted model for product suggestions. Discovery treats the
//! answer as optional extra text; failures never block search results.

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    /// Client for the configured key; `None` without one
    pub fn from_config(config: &DiscoveryConfig) -> Result<Option<Self>, DiscoveryError> {
        let Some(api_key) = config.openrouter_api_key.as_deref() else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: config.http_client()?,
            api_key: api_key.to_string(),
            model: config.openrouter_model.clone(),
            base_url: config.openrouter_base_url.trim_end_matches('/').to_string(),
        }))
    }

    fn prompt(query: &str) -> String {
        format!(
            "Discover products for: {}. Return a JSON array of product suggestions with title, description, and estimated price.",
            query
        )
    }

    /// Suggestions text from the first choice, if any
    pub async fn suggest(&self, query: &str) -> Result<Option<String>, DiscoveryError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: Self::prompt(query),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DiscoveryError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::RequestFailed(format!(
                "OpenRouter HTTP {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DiscoveryError::ParseError(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty());

        debug!(model = %self.model, has_content = content.is_some(), "AI discovery response");
        Ok(content)
    }
}
