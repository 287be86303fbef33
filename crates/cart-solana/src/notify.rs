//! # Verification Notifier
//!
//! After a payment confirms, the checkout flow reports `{txId, amount}` to
//! the verification endpoint. Delivery is fire-and-forget: the outcome is
//! logged and never changes the payment result.

use crate::config::SolanaConfig;
use async_trait::async_trait;
use cart_core::{PaymentError, PaymentResult, VerifyRequest};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// What happened to a verification notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Endpoint answered 2xx
    Delivered { status: u16 },
    /// Endpoint answered with a non-success status
    Rejected { status: u16, body: String },
    /// Request never completed
    Unreachable(String),
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationOutcome::Delivered { .. })
    }

    /// Log the outcome for a transaction
    pub fn log(&self, tx_id: &str) {
        match self {
            NotificationOutcome::Delivered { status } => {
                info!("Verification delivered for {} (HTTP {})", tx_id, status)
            }
            NotificationOutcome::Rejected { status, body } => {
                warn!("Verification rejected for {} (HTTP {}): {}", tx_id, status, body)
            }
            NotificationOutcome::Unreachable(reason) => {
                warn!("Verification endpoint unreachable for {}: {}", tx_id, reason)
            }
        }
    }
}

/// Reports confirmed payments to the storefront backend.
#[async_trait]
pub trait VerificationNotifier: Send + Sync {
    async fn notify(&self, notice: &VerifyRequest) -> NotificationOutcome;
}

/// POSTs notifications as JSON to a checkout endpoint
pub struct HttpVerificationNotifier {
    client: Client,
    endpoint: String,
}

impl HttpVerificationNotifier {
    pub fn new(endpoint: impl Into<String>) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PaymentError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Notifier for `CHECKOUT_VERIFY_URL`, if configured
    pub fn from_config(config: &SolanaConfig) -> PaymentResult<Option<Self>> {
        config.verify_url.as_deref().map(Self::new).transpose()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VerificationNotifier for HttpVerificationNotifier {
    async fn notify(&self, notice: &VerifyRequest) -> NotificationOutcome {
        let response = match self.client.post(&self.endpoint).json(notice).send().await {
            Ok(response) => response,
            Err(e) => return NotificationOutcome::Unreachable(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            NotificationOutcome::Delivered {
                status: status.as_u16(),
            }
        } else {
            NotificationOutcome::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }
        }
    }
}
