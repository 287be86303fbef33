//! Discovery error types

use thiserror::Error;

/// Errors that can occur during product discovery
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("Please enter a search query")]
    EmptyQuery,

    #[error("No products found. Please try a different search.")]
    NoResults,

    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse search results: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DiscoveryError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DiscoveryError::EmptyQuery => 400,
            DiscoveryError::NoResults => 404,
            DiscoveryError::RequestFailed(_) => 502,
            DiscoveryError::ParseError(_) => 502,
            DiscoveryError::Configuration(_) => 500,
        }
    }
}
