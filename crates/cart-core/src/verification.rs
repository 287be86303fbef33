//! # Checkout Verification
//!
//! Policy behind `POST /api/checkout`. First match wins:
//!
//! 1. `paymentMethod == "x402"`: synthesize a success record (no settlement).
//! 2. `txId` present: look the transaction up on the ledger.
//! 3. otherwise: generic acknowledgment.
//!
//! The lookup is advisory: recipient and amount are not checked against the
//! transaction content. `amount` is echoed back exactly as the caller sent it.

use crate::address::Address;
use crate::error::{PaymentError, PaymentResult};
use crate::ledger::BoxedLedgerClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Payment method value selecting the stubbed HTTP payment flow
pub const X402_METHOD: &str = "x402";

/// Upper bound on remembered x402 idempotency keys
const MAX_SETTLED_RECORDS: usize = 1024;

/// Body of a verification call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Repeating a key returns the record created by the first call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl VerifyRequest {
    /// Notification sent after a wallet payment confirms
    pub fn for_transaction(tx_id: impl Into<String>, amount: Option<f64>) -> Self {
        Self {
            tx_id: Some(tx_id.into()),
            amount: amount.map(Value::from),
            ..Self::default()
        }
    }

    /// x402 payment intent
    pub fn x402(amount: f64) -> Self {
        Self {
            amount: Some(Value::from(amount)),
            payment_method: Some(X402_METHOD.to_string()),
            ..Self::default()
        }
    }

    fn tx_id(&self) -> Option<&str> {
        self.tx_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Verified,
}

/// Synthesized checkout record (x402 stub and generic acknowledgment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRecord {
    pub id: String,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl CheckoutRecord {
    fn new(payment_method: Option<String>, amount: Option<Value>, message: &str) -> Self {
        Self {
            id: format!("checkout_{}", Uuid::new_v4().simple()),
            status: RecordStatus::Success,
            payment_method,
            amount,
            message: message.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Ledger lookup result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedTransaction {
    pub status: RecordStatus,
    pub tx_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    /// x402 stub
    Settled(CheckoutRecord),
    /// Ledger lookup
    Verified(VerifiedTransaction),
    /// Nothing to check
    Acknowledged(CheckoutRecord),
}

/// x402 records by idempotency key, oldest evicted first
#[derive(Debug, Default)]
struct SettledRecords {
    records: HashMap<String, CheckoutRecord>,
    order: VecDeque<String>,
}

impl SettledRecords {
    fn get(&self, key: &str) -> Option<&CheckoutRecord> {
        self.records.get(key)
    }

    /// Insert a record for a key that is not yet present
    fn insert(&mut self, key: String, record: CheckoutRecord) {
        if self.order.len() >= MAX_SETTLED_RECORDS {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Evicting x402 record for idempotency key {}", oldest);
                self.records.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.records.insert(key, record);
    }
}

/// Stateless apart from the x402 idempotency records
pub struct CheckoutVerifier {
    ledger: BoxedLedgerClient,
    merchant: Option<Address>,
    settled: Mutex<SettledRecords>,
}

impl CheckoutVerifier {
    pub fn new(ledger: BoxedLedgerClient) -> Self {
        Self {
            ledger,
            merchant: None,
            settled: Mutex::new(SettledRecords::default()),
        }
    }

    /// Builder: merchant address (logged alongside lookups, not enforced)
    pub fn with_merchant(mut self, merchant: Option<Address>) -> Self {
        self.merchant = merchant;
        self
    }

    #[instrument(skip(self, request), fields(tx_id = ?request.tx_id, method = ?request.payment_method))]
    pub async fn verify(&self, request: &VerifyRequest) -> PaymentResult<VerifyResponse> {
        if request.payment_method.as_deref() == Some(X402_METHOD) {
            return self.settle_x402(request).map(VerifyResponse::Settled);
        }

        if let Some(tx_id) = request.tx_id() {
            return self
                .lookup(tx_id, request.amount.clone())
                .await
                .map(VerifyResponse::Verified);
        }

        let record = CheckoutRecord::new(None, None, "Checkout processed");
        info!("Acknowledged checkout without payment details: {}", record.id);
        Ok(VerifyResponse::Acknowledged(record))
    }

    fn settle_x402(&self, request: &VerifyRequest) -> PaymentResult<CheckoutRecord> {
        let mut settled = self
            .settled
            .lock()
            .map_err(|e| PaymentError::Internal(format!("settlement records poisoned: {}", e)))?;

        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = settled.get(key) {
                info!("Replaying x402 record {} for idempotency key {}", existing.id, key);
                return Ok(existing.clone());
            }
        }

        let record = CheckoutRecord::new(
            Some(X402_METHOD.to_string()),
            request.amount.clone(),
            "x402 payment processed successfully",
        );
        info!("x402 payment stubbed: id={}, amount={:?}", record.id, record.amount);

        if let Some(key) = &request.idempotency_key {
            settled.insert(key.clone(), record.clone());
        }
        Ok(record)
    }

    async fn lookup(&self, tx_id: &str, amount: Option<Value>) -> PaymentResult<VerifiedTransaction> {
        let tx = self.ledger.get_transaction(tx_id).await.map_err(|e| {
            error!("Transaction verification error: {}", e);
            PaymentError::VerificationFailed(e.to_string())
        })?;

        let tx = tx.ok_or_else(|| PaymentError::NotFound {
            tx_id: tx_id.to_string(),
        })?;

        if let Some(merchant) = &self.merchant {
            debug!("Recipient not cross-checked against merchant {}", merchant.short());
        }

        let confirmed = tx.is_confirmed();
        info!("Verified {}: slot={}, confirmed={}", tx_id, tx.slot, confirmed);

        Ok(VerifiedTransaction {
            status: RecordStatus::Verified,
            tx_id: tx_id.to_string(),
            amount,
            confirmed,
        })
    }
}
