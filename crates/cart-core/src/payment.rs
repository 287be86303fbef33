//! # Payment Types
//!
//! Request, receipt and status types for a single wallet payment attempt.

use crate::address::Address;
use crate::amount::Lamports;
use crate::error::PaymentResult;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// A transfer the customer is asked to sign.
///
/// Built fresh for every attempt; `request_id` doubles as the idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Unique per attempt
    pub request_id: String,

    /// Merchant address receiving the transfer
    pub recipient: Address,

    /// Amount to transfer
    pub amount: Lamports,

    /// Optional memo attached as a memo-program instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl PaymentRequest {
    /// Create a request with a freshly minted id
    pub fn new(recipient: Address, amount: Lamports) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            recipient,
            amount,
            memo: None,
        }
    }

    /// Build from user input: a recipient string and a decimal SOL amount
    pub fn from_sol(recipient: &str, amount_sol: f64) -> PaymentResult<Self> {
        let recipient = Address::parse_recipient(recipient)?;
        let amount = Lamports::from_sol(amount_sol)?;
        Ok(Self::new(recipient, amount))
    }

    /// Builder: attach a memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Builder: override the request id
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }
}

/// Outcome of a submitted and confirmed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction signature (base58)
    pub signature_id: String,

    /// Blockhash the transaction was built against
    pub blockhash: String,

    /// Last block height at which the blockhash is valid
    pub last_valid_block_height: u64,

    /// `Some(true)` when the ledger reported no execution error,
    /// `Some(false)` when it did, `None` when unknown
    pub confirmed: Option<bool>,
}

/// Transient status narrative for one checkout attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutStatus {
    Preparing,
    Signing,
    Sending,
    Confirming,
    Succeeded { signature: String },
    Failed { reason: String },
}

impl CheckoutStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutStatus::Succeeded { .. } | CheckoutStatus::Failed { .. }
        )
    }
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutStatus::Preparing => write!(f, "Preparing transaction..."),
            CheckoutStatus::Signing => write!(f, "Signing transaction..."),
            CheckoutStatus::Sending => write!(f, "Sending transaction..."),
            CheckoutStatus::Confirming => write!(f, "Confirming transaction..."),
            CheckoutStatus::Succeeded { signature } => {
                write!(f, "Payment successful! Transaction ID: {}", signature)
            }
            CheckoutStatus::Failed { reason } => write!(f, "Payment failed: {}", reason),
        }
    }
}

/// Receives status updates as a payment attempt progresses.
pub trait StatusObserver: Send + Sync {
    fn on_status(&self, status: &CheckoutStatus);
}

/// Default observer (just logs transitions)
pub struct LoggingStatusObserver;

impl StatusObserver for LoggingStatusObserver {
    fn on_status(&self, status: &CheckoutStatus) {
        match status {
            CheckoutStatus::Failed { .. } => warn!("{}", status),
            _ => info!("{}", status),
        }
    }
}
