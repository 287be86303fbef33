//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the catalog, the checkout verifier, discovery and configuration.

use anyhow::Context;
use cart_core::{Address, BoxedLedgerClient, CheckoutVerifier, ProductCatalog};
use cart_discovery::{DiscoveryConfig, ProductDiscovery};
use cart_solana::{RpcLedgerClient, SolanaConfig};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Verification policy behind `POST /api/checkout`
    pub verifier: Arc<CheckoutVerifier>,
    /// Product discovery
    pub discovery: ProductDiscovery,
    /// Merchant wallet, when configured
    pub merchant: Option<Address>,
    /// Ledger endpoint used for verification
    pub rpc_url: String,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment with the JSON-RPC ledger client
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let solana = SolanaConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Solana config: {}", e))?;

        if !solana.is_test_cluster() {
            tracing::warn!(
                "Ledger endpoint {} is not a test cluster; payments move real funds",
                solana.rpc_url
            );
        }

        let ledger = RpcLedgerClient::new(&solana)
            .map_err(|e| anyhow::anyhow!("Failed to initialize ledger client: {}", e))?;

        let discovery = ProductDiscovery::from_config(&DiscoveryConfig::from_env())
            .context("Failed to initialize product discovery")?;

        let catalog = load_product_catalog()?;

        let mut state = Self::with_ledger(Arc::new(ledger), solana.merchant_address)
            .with_catalog(catalog)
            .with_discovery(discovery);
        state.config = config;
        Ok(state)
    }

    /// State around an explicit ledger client, demo catalog and mock discovery
    pub fn with_ledger(ledger: BoxedLedgerClient, merchant: Option<Address>) -> Self {
        let rpc_url = ledger.endpoint_name().to_string();
        let verifier = CheckoutVerifier::new(ledger).with_merchant(merchant);

        Self {
            catalog: Arc::new(ProductCatalog::demo()),
            verifier: Arc::new(verifier),
            discovery: ProductDiscovery::offline(),
            merchant,
            rpc_url,
            config: AppConfig::default(),
        }
    }

    /// Builder: replace the catalog
    pub fn with_catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Builder: replace discovery
    pub fn with_discovery(mut self, discovery: ProductDiscovery) -> Self {
        self.discovery = discovery;
        self
    }
}

/// Load product catalog from config file
fn load_product_catalog() -> anyhow::Result<ProductCatalog> {
    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = ProductCatalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path))?;
            tracing::info!("Loaded {} products from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No product catalog found, using demo catalog");
    Ok(ProductCatalog::demo())
}
