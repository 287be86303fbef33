//! # Solana Configuration
//!
//! Configuration for the ledger endpoint and merchant wallet.
//! Everything is optional; missing values fall back to devnet defaults.

use cart_core::{Address, PaymentError};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Public devnet endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Commitment level used for reads and confirmation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// `getTransaction` rejects `processed`
    pub fn for_lookup(&self) -> Commitment {
        match self {
            Commitment::Processed => Commitment::Confirmed,
            other => *other,
        }
    }

    /// Whether a reported signature status meets this level.
    ///
    /// A status with neither a level nor a confirmation count is rooted.
    pub fn is_reached(&self, status: Option<&str>, confirmations: Option<u64>) -> bool {
        let reached = match status.and_then(|s| s.parse::<Commitment>().ok()) {
            Some(level) => level,
            None if confirmations.is_none() => Commitment::Finalized,
            None => Commitment::Processed,
        };
        reached >= *self
    }
}

impl std::str::FromStr for Commitment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(PaymentError::Configuration(format!(
                "unknown commitment level: {}",
                other
            ))),
        }
    }
}

/// Ledger and merchant configuration
#[derive(Debug, Clone)]
pub struct SolanaConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,

    /// Merchant wallet receiving payments
    pub merchant_address: Option<Address>,

    /// Commitment for reads and confirmation
    pub commitment: Commitment,

    /// Delay between confirmation polls
    pub confirm_poll_interval: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Where confirmed payments are reported (`POST /api/checkout`)
    pub verify_url: Option<String>,
}

impl SolanaConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `SOLANA_RPC_URL` (default: devnet)
    /// - `MERCHANT_WALLET_ADDRESS`
    /// - `SOLANA_COMMITMENT` (default: confirmed)
    /// - `CONFIRM_POLL_INTERVAL_MS` (default: 500)
    /// - `CHECKOUT_VERIFY_URL`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_vars<F>(get: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let merchant_address = match get("MERCHANT_WALLET_ADDRESS") {
            Some(addr) => Some(addr.trim().parse::<Address>().map_err(|e| {
                PaymentError::Configuration(format!("MERCHANT_WALLET_ADDRESS: {}", e))
            })?),
            None => None,
        };

        let commitment = match get("SOLANA_COMMITMENT") {
            Some(level) => level.parse()?,
            None => Commitment::default(),
        };

        let confirm_poll_interval = match get("CONFIRM_POLL_INTERVAL_MS") {
            Some(ms) => Duration::from_millis(ms.trim().parse().map_err(|_| {
                PaymentError::Configuration(format!(
                    "CONFIRM_POLL_INTERVAL_MS must be an integer, got {}",
                    ms
                ))
            })?),
            None => Duration::from_millis(500),
        };

        Ok(Self {
            rpc_url: get("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            merchant_address,
            commitment,
            confirm_poll_interval,
            request_timeout: Duration::from_secs(30),
            verify_url: get("CHECKOUT_VERIFY_URL"),
        })
    }

    /// Create config for an explicit endpoint (for testing)
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            merchant_address: None,
            commitment: Commitment::Confirmed,
            confirm_poll_interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            verify_url: None,
        }
    }

    /// Builder: set merchant address
    pub fn with_merchant(mut self, merchant: Address) -> Self {
        self.merchant_address = Some(merchant);
        self
    }

    /// Builder: set confirmation poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.confirm_poll_interval = interval;
        self
    }

    /// Check if pointed at a non-mainnet cluster
    pub fn is_test_cluster(&self) -> bool {
        self.rpc_url.contains("devnet") || self.rpc_url.contains("testnet") || self.rpc_url.contains("localhost")
    }
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_URL)
    }
}
