//! Google Custom Search client
//!
//! Queries the Custom Search JSON API with `"{query} products buy"` and
//! maps `items` to `DiscoveredProduct`s.

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::{DiscoveredProduct, SearchProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

pub struct GoogleSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
    search_url: String,
}

impl GoogleSearchClient {
    /// Client for the configured credentials; `None` when either is missing
    pub fn from_config(config: &DiscoveryConfig) -> Result<Option<Self>, DiscoveryError> {
        let Some((api_key, engine_id)) = config.google_credentials() else {
            return Ok(None);
        };

        Ok(Some(Self {
            client: config.http_client()?,
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            search_url: config.google_search_url.clone(),
        }))
    }

    fn product_query(query: &str) -> String {
        format!("{} products buy", query)
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<DiscoveredProduct>, DiscoveryError> {
        info!(query = %query, "Searching Google Custom Search");

        let q = Self::product_query(query);
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", q.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DiscoveryError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DiscoveryError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            error!("Google search error: status={}, body={}", status, body);
            let message = serde_json::from_str::<GoogleErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(DiscoveryError::RequestFailed(message));
        }

        let parsed: GoogleSearchResponse = serde_json::from_str(&body)
            .map_err(|e| DiscoveryError::ParseError(e.to_string()))?;

        let items = parsed.items.unwrap_or_default();
        if items.is_empty() {
            return Err(DiscoveryError::NoResults);
        }

        debug!("Google returned {} items", items.len());
        Ok(items
            .into_iter()
            .map(|item| DiscoveredProduct {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
                display_link: item.display_link,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "google"
    }
}

// Google API wire types

#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    #[serde(default)]
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    display_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}
