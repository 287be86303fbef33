//! # cart-discovery
//!
//! Product discovery for the solcart storefront.
//!
//! ## Search strategy
//!
//! 1. **AI assistant (optional)**: with `OPENROUTER_API_KEY`, a chat model is
//!    asked for suggestions. Best effort; a failure is logged and skipped.
//! 2. **Google Custom Search**: with `GOOGLE_API_KEY` and
//!    `GOOGLE_SEARCH_ENGINE_ID`, live web results for `"{query} products buy"`.
//! 3. **Mock results**: otherwise two placeholder products built from the query.

pub mod config;
pub mod error;
pub mod google;
pub mod openrouter;

pub use config::DiscoveryConfig;
pub use error::DiscoveryError;
pub use google::GoogleSearchClient;
pub use openrouter::OpenRouterClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A product link found by a search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredProduct {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_link: Option<String>,
}

/// Discovery response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResults {
    pub query: String,
    pub products: Vec<DiscoveredProduct>,
    /// Provider that produced `products`
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggestions: Option<String>,
}

/// A web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<DiscoveredProduct>, DiscoveryError>;

    fn name(&self) -> &str;
}

/// Placeholder results for demos without search credentials
pub struct MockSearch;

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<DiscoveredProduct>, DiscoveryError> {
        Ok(vec![
            DiscoveredProduct {
                title: format!("{} - Premium Product", query),
                link: "#".to_string(),
                snippet: Some(format!("High-quality {} available now", query)),
                display_link: Some("example.com".to_string()),
            },
            DiscoveredProduct {
                title: format!("{} - Best Value", query),
                link: "#".to_string(),
                snippet: Some(format!("Affordable {} with great features", query)),
                display_link: Some("example.com".to_string()),
            },
        ])
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Discovery service combining a search provider with an optional assistant
#[derive(Clone)]
pub struct ProductDiscovery {
    search: Arc<dyn SearchProvider>,
    assistant: Option<Arc<OpenRouterClient>>,
}

impl ProductDiscovery {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            assistant: None,
        }
    }

    /// Build from configuration, falling back to mock search
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let search: Arc<dyn SearchProvider> = match GoogleSearchClient::from_config(config)? {
            Some(google) => Arc::new(google),
            None => {
                info!("Google search not configured, serving mock discovery results");
                Arc::new(MockSearch)
            }
        };

        Ok(Self {
            search,
            assistant: OpenRouterClient::from_config(config)?.map(Arc::new),
        })
    }

    /// Offline discovery (mock search, no assistant)
    pub fn offline() -> Self {
        Self::new(Arc::new(MockSearch))
    }

    pub fn source(&self) -> &str {
        self.search.name()
    }

    #[instrument(skip(self))]
    pub async fn discover(&self, query: &str) -> Result<DiscoveryResults, DiscoveryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DiscoveryError::EmptyQuery);
        }

        let ai_suggestions = match &self.assistant {
            Some(assistant) => match assistant.suggest(query).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("AI discovery failed, continuing with search: {}", e);
                    None
                }
            },
            None => None,
        };

        let products = self.search.search(query).await?;
        info!(count = products.len(), source = self.search.name(), "Discovery completed");

        Ok(DiscoveryResults {
            query: query.to_string(),
            products,
            source: self.search.name().to_string(),
            ai_suggestions,
        })
    }
}
