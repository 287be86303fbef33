//! # Ledger Client Trait
//!
//! The remote ledger is consumed through this trait; it is never
//! reimplemented here. `cart-solana` provides a JSON-RPC implementation,
//! tests provide in-memory ones.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │           LedgerClient (trait)            │
//! │  ├── get_latest_blockhash()               │
//! │  ├── send_raw_transaction()               │
//! │  ├── confirm_transaction()                │
//! │  └── get_transaction()                    │
//! └───────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴───────┐       ┌───────┴───────┐
//!  │RpcLedgerClient│       │  test doubles │
//!  └───────────────┘       └───────────────┘
//! ```

use crate::error::PaymentResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A blockhash together with the height after which it expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// Everything needed to wait for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub signature: String,
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// Result of a successful confirmation wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureConfirmation {
    /// Slot the transaction landed in
    pub slot: u64,
    /// Execution error reported by the ledger, if any
    pub err: Option<serde_json::Value>,
}

/// Transaction status metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub fee: Option<u64>,
}

/// A transaction as returned by `get_transaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
}

impl LedgerTransaction {
    /// True when metadata is present and carries no error
    pub fn is_confirmed(&self) -> bool {
        self.meta.as_ref().map(|m| m.err.is_none()).unwrap_or(false)
    }
}

/// Remote ledger operations used by checkout and verification.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch a fresh blockhash. Callers must not reuse it across attempts.
    async fn get_latest_blockhash(&self) -> PaymentResult<LatestBlockhash>;

    /// Submit signed wire bytes; returns the transaction signature.
    async fn send_raw_transaction(&self, bytes: &[u8]) -> PaymentResult<String>;

    /// Wait until the transaction is confirmed, or fail with
    /// `PaymentError::Expired` once the chain passes `last_valid_block_height`.
    async fn confirm_transaction(
        &self,
        request: &ConfirmationRequest,
    ) -> PaymentResult<SignatureConfirmation>;

    /// Look up a transaction by signature; `None` when the ledger has no record.
    async fn get_transaction(&self, signature: &str) -> PaymentResult<Option<LedgerTransaction>>;

    /// Name used in logs
    fn endpoint_name(&self) -> &str {
        "ledger"
    }
}

/// Shared ledger client (dynamic dispatch)
pub type BoxedLedgerClient = Arc<dyn LedgerClient>;
