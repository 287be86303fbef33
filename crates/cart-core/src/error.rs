//! # Payment Error Types
//!
//! Typed error handling for the solcart checkout and verification flows.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// No wallet is connected to the session
    #[error("Wallet not connected")]
    NotConnected,

    /// Recipient address missing or malformed
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Signing was declined by the user or the wallet extension
    #[error("Signature rejected: {0}")]
    UserRejected(String),

    /// The blockhash expired before the transaction was confirmed
    #[error("Transaction {signature} expired: block height exceeded {last_valid_block_height}")]
    Expired {
        signature: String,
        last_valid_block_height: u64,
    },

    /// Ledger RPC unreachable or returned an error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The verification endpoint failed while querying the ledger
    #[error("Failed to verify transaction: {0}")]
    VerificationFailed(String),

    /// Unknown transaction id
    #[error("Transaction not found")]
    NotFound { tx_id: String },

    /// Amount is negative, not finite, or out of range
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Configuration errors (missing or malformed settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns true if the user can reasonably start a new attempt.
    ///
    /// Nothing in the crate retries automatically; this only drives messaging.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::NetworkError(_)
                | PaymentError::Expired { .. }
                | PaymentError::UserRejected(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::NotConnected => 401,
            PaymentError::InvalidRecipient(_) => 400,
            PaymentError::UserRejected(_) => 400,
            PaymentError::Expired { .. } => 408,
            PaymentError::NetworkError(_) => 503,
            PaymentError::VerificationFailed(_) => 500,
            PaymentError::NotFound { .. } => 404,
            PaymentError::InvalidAmount(_) => 400,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::ProductNotFound { .. } => 404,
            PaymentError::Configuration(_) => 500,
            PaymentError::Serialization(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
