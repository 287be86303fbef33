//! # Addresses
//!
//! Base58-encoded 32-byte account addresses.

use crate::error::PaymentError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Length of an account public key in bytes
pub const ADDRESS_LEN: usize = 32;

/// System program id (all zero bytes)
pub const SYSTEM_PROGRAM_ID: Address = Address([0u8; ADDRESS_LEN]);

/// SPL memo program id
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// An account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Parse a recipient entered by a user or read from config.
    /// Any failure becomes `InvalidRecipient`.
    pub fn parse_recipient(s: &str) -> Result<Self, PaymentError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PaymentError::InvalidRecipient(
                "recipient address is empty".to_string(),
            ));
        }
        trimmed.parse()
    }

    /// Abbreviated form for display and logs (first and last 8 characters)
    pub fn short(&self) -> String {
        let full = self.to_string();
        if full.len() <= 16 {
            return full;
        }
        format!("{}...{}", &full[..8], &full[full.len() - 8..])
    }

    /// The SPL memo program address
    pub fn memo_program() -> Result<Self, PaymentError> {
        MEMO_PROGRAM_ID
            .parse()
            .map_err(|e| PaymentError::Internal(format!("memo program id: {}", e)))
    }
}

impl FromStr for Address {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| PaymentError::InvalidRecipient(format!("{}: {}", s, e)))?;

        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            PaymentError::InvalidRecipient(format!(
                "{}: expected {} bytes, got {}",
                s,
                ADDRESS_LEN,
                v.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
