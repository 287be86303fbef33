//! # Order Types
//!
//! An order snapshots a cart and carries its total into the payment request,
//! so the amount the customer signs is the amount the cart showed.

use crate::address::Address;
use crate::amount::Lamports;
use crate::cart::{Cart, CartItem};
use crate::error::{PaymentError, PaymentResult};
use crate::payment::PaymentRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// An order to be checked out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    /// Line items copied from the cart
    pub line_items: Vec<CartItem>,

    /// Idempotency key (prevents duplicate charges on manual retries)
    pub idempotency_key: String,

    /// Custom metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot a cart into an order
    pub fn from_cart(cart: &Cart) -> PaymentResult<Self> {
        if cart.is_empty() {
            return Err(PaymentError::InvalidRequest("Order has no items".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            line_items: cart.items().to_vec(),
            idempotency_key: Uuid::new_v4().to_string(),
            metadata: HashMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Calculate order total
    pub fn total(&self) -> Lamports {
        self.line_items.iter().map(CartItem::total).sum()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }

    /// Set idempotency key
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Payment request for this order's total, paid to `merchant`.
    ///
    /// The request id is the order's idempotency key and the memo names the order.
    pub fn payment_request(&self, merchant: Address) -> PaymentRequest {
        PaymentRequest::new(merchant, self.total())
            .with_request_id(self.idempotency_key.clone())
            .with_memo(format!("order:{}", self.id))
    }
}
