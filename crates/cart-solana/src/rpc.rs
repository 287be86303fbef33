//! # Solana JSON-RPC Ledger Client
//!
//! `LedgerClient` over the public JSON-RPC API. Only the five calls the
//! checkout flow and verifier need are wrapped.

use crate::config::{Commitment, SolanaConfig};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cart_core::{
    ConfirmationRequest, LatestBlockhash, LedgerClient, LedgerTransaction, PaymentError,
    PaymentResult, SignatureConfirmation,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// JSON-RPC ledger client
pub struct RpcLedgerClient {
    rpc_url: String,
    commitment: Commitment,
    poll_interval: Duration,
    client: Client,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &SolanaConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            commitment: config.commitment,
            poll_interval: config.confirm_poll_interval,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(&SolanaConfig::from_env()?)
    }

    /// Issue one JSON-RPC call and decode its `result`
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> PaymentResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("RPC {} (id={})", method, id);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("RPC {} failed: status={}, body={}", method, status, text);
            return Err(PaymentError::NetworkError(format!("HTTP {}: {}", status, text)));
        }

        let envelope: RpcEnvelope = serde_json::from_str(&text).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse {} response: {}", method, e))
        })?;

        if let Some(err) = envelope.error {
            warn!("RPC {} returned error {}: {}", method, err.code, err.message);
            return Err(PaymentError::NetworkError(format!(
                "{} (code {})",
                err.message, err.code
            )));
        }

        // `null` results are meaningful (getTransaction on an unknown signature)
        serde_json::from_value(envelope.result.unwrap_or(Value::Null)).map_err(|e| {
            PaymentError::Serialization(format!("Unexpected {} result: {}", method, e))
        })
    }

    /// Current status of one signature, if it has reached our commitment
    async fn reached_status(&self, signature: &str) -> PaymentResult<Option<SignatureConfirmation>> {
        let statuses: RpcContext<Vec<Option<RpcSignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": false }]),
            )
            .await?;

        let status = match statuses.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(None),
        };

        if self
            .commitment
            .is_reached(status.confirmation_status.as_deref(), status.confirmations)
        {
            Ok(Some(SignatureConfirmation {
                slot: status.slot,
                err: status.err,
            }))
        } else {
            Ok(None)
        }
    }

    async fn block_height(&self) -> PaymentResult<u64> {
        self.call(
            "getBlockHeight",
            json!([{ "commitment": self.commitment.as_str() }]),
        )
        .await
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    #[instrument(skip(self))]
    async fn get_latest_blockhash(&self) -> PaymentResult<LatestBlockhash> {
        let response: RpcContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;

        debug!(
            "Latest blockhash {} valid until height {}",
            response.value.blockhash, response.value.last_valid_block_height
        );
        Ok(response.value)
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn send_raw_transaction(&self, bytes: &[u8]) -> PaymentResult<String> {
        let encoded = BASE64.encode(bytes);
        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base64",
                        "skipPreflight": false,
                        "preflightCommitment": self.commitment.as_str(),
                    }
                ]),
            )
            .await?;

        info!("Submitted transaction {}", signature);
        Ok(signature)
    }

    #[instrument(skip(self, request), fields(signature = %request.signature))]
    async fn confirm_transaction(
        &self,
        request: &ConfirmationRequest,
    ) -> PaymentResult<SignatureConfirmation> {
        loop {
            if let Some(confirmation) = self.reached_status(&request.signature).await? {
                info!("Transaction confirmed in slot {}", confirmation.slot);
                return Ok(confirmation);
            }

            let height = self.block_height().await?;
            if height > request.last_valid_block_height {
                // it may have landed between the two calls
                if let Some(confirmation) = self.reached_status(&request.signature).await? {
                    return Ok(confirmation);
                }
                warn!(
                    "Blockhash expired at height {} (last valid {})",
                    height, request.last_valid_block_height
                );
                return Err(PaymentError::Expired {
                    signature: request.signature.clone(),
                    last_valid_block_height: request.last_valid_block_height,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    #[instrument(skip(self))]
    async fn get_transaction(&self, signature: &str) -> PaymentResult<Option<LedgerTransaction>> {
        self.call(
            "getTransaction",
            json!([
                signature,
                {
                    "encoding": "json",
                    "maxSupportedTransactionVersion": 0,
                    "commitment": self.commitment.for_lookup().as_str(),
                }
            ]),
        )
        .await
    }

    fn endpoint_name(&self) -> &str {
        &self.rpc_url
    }
}

// ============================================================================
// JSON-RPC wire types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSignatureStatus {
    slot: u64,
    #[serde(default)]
    confirmations: Option<u64>,
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    confirmation_status: Option<String>,
}
