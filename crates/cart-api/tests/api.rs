use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use cart_api::{create_router, AppState};
use cart_core::{
    Address, ConfirmationRequest, LatestBlockhash, LedgerClient, LedgerTransaction, PaymentError,
    PaymentResult, SignatureConfirmation, TransactionMeta,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const MERCHANT: &str = "So11111111111111111111111111111111111111112";

/// Ledger with a fixed set of known transactions
#[derive(Default)]
struct MapLedger {
    transactions: HashMap<String, LedgerTransaction>,
    lookups: AtomicUsize,
}

impl MapLedger {
    fn with(mut self, signature: &str, err: Option<Value>) -> Self {
        self.transactions.insert(
            signature.to_string(),
            LedgerTransaction {
                slot: 7,
                block_time: Some(1_700_000_000),
                meta: Some(TransactionMeta { err, fee: Some(5000) }),
            },
        );
        self
    }
}

#[async_trait]
impl LedgerClient for MapLedger {
    async fn get_latest_blockhash(&self) -> PaymentResult<LatestBlockhash> {
        Err(PaymentError::Internal("unused".to_string()))
    }

    async fn send_raw_transaction(&self, _bytes: &[u8]) -> PaymentResult<String> {
        Err(PaymentError::Internal("unused".to_string()))
    }

    async fn confirm_transaction(
        &self,
        _request: &ConfirmationRequest,
    ) -> PaymentResult<SignatureConfirmation> {
        Err(PaymentError::Internal("unused".to_string()))
    }

    async fn get_transaction(&self, signature: &str) -> PaymentResult<Option<LedgerTransaction>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.transactions.get(signature).cloned())
    }
}

fn server_with(ledger: Arc<MapLedger>, merchant: Option<Address>) -> TestServer {
    let state = AppState::with_ledger(ledger, merchant);
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> (TestServer, Arc<MapLedger>) {
    let ledger = Arc::new(
        MapLedger::default()
            .with("abc", None)
            .with("failed-tx", Some(json!({"InstructionError": [0, "Custom"]}))),
    );
    (server_with(ledger.clone(), None), ledger)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_service() {
    let (server, _) = server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "solcart");
    assert!(body["version"].is_string());
}

// =============================================================================
// POST /api/checkout
// =============================================================================

#[tokio::test]
async fn x402_payment_is_stubbed_without_ledger() {
    let (server, ledger) = server();

    let response = server
        .post("/api/checkout")
        .json(&json!({ "paymentMethod": "x402", "amount": 0.01 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["paymentMethod"], "x402");
    assert_eq!(body["amount"], 0.01);
    assert_eq!(body["message"], "x402 payment processed successfully");
    assert!(body["id"].as_str().unwrap().starts_with("checkout_"));
    assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn x402_wins_over_tx_id() {
    let (server, ledger) = server();

    let response = server
        .post("/api/checkout")
        .json(&json!({ "paymentMethod": "x402", "txId": "abc", "amount": 1.0 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn x402_idempotency_key_replays_record() {
    let (server, _) = server();
    let request = json!({ "paymentMethod": "x402", "amount": 0.5, "idempotencyKey": "order-42" });

    let first: Value = server.post("/api/checkout").json(&request).await.json();
    let second: Value = server.post("/api/checkout").json(&request).await.json();
    let other: Value = server
        .post("/api/checkout")
        .json(&json!({ "paymentMethod": "x402", "amount": 0.5, "idempotencyKey": "order-43" }))
        .await
        .json();

    assert_eq!(first["id"], second["id"]);
    assert_ne!(first["id"], other["id"]);
}

#[tokio::test]
async fn unknown_transaction_is_404() {
    let (server, _) = server();

    let response = server
        .post("/api/checkout")
        .json(&json!({ "txId": "unknown" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "Transaction not found");
}

#[tokio::test]
async fn known_transaction_is_verified() {
    let (server, _) = server();

    let response = server
        .post("/api/checkout")
        .json(&json!({ "txId": "abc", "amount": 0.5 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "verified");
    assert_eq!(body["txId"], "abc");
    assert_eq!(body["amount"], 0.5);
    assert_eq!(body["confirmed"], true);
}

#[tokio::test]
async fn failed_transaction_is_unconfirmed() {
    let (server, _) = server();

    let body: Value = server
        .post("/api/checkout")
        .json(&json!({ "txId": "failed-tx" }))
        .await
        .json();

    assert_eq!(body["status"], "verified");
    assert_eq!(body["confirmed"], false);
}

#[tokio::test]
async fn empty_body_is_acknowledged() {
    let (server, ledger) = server();

    let response = server.post("/api/checkout").json(&json!({})).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Checkout processed");
    assert!(body["id"].as_str().unwrap().starts_with("checkout_"));
    assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_tx_id_is_acknowledged() {
    let (server, ledger) = server();

    let body: Value = server
        .post("/api/checkout")
        .json(&json!({ "txId": "" }))
        .await
        .json();

    assert_eq!(body["message"], "Checkout processed");
    assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (server, _) = server();

    let response = server
        .post("/api/checkout")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid request: malformed JSON body");
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn wrong_field_type_is_json_500() {
    let (server, ledger) = server();

    let response = server
        .post("/api/checkout")
        .json(&json!({ "txId": 123 }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].is_string());
    assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn string_amount_is_echoed() {
    let (server, _) = server();

    let response = server
        .post("/api/checkout")
        .json(&json!({ "paymentMethod": "x402", "amount": "0.01" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["amount"], "0.01");
}

#[tokio::test]
async fn body_is_parsed_without_json_content_type() {
    let (server, _) = server();

    let response = server
        .post("/api/checkout")
        .text(r#"{"txId":"abc","amount":0.5}"#)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "verified");
    assert_eq!(body["confirmed"], true);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn lists_active_products() {
    let (server, _) = server();

    let body: Value = server.get("/api/products").await.json();
    assert_eq!(body["count"], 3);
    assert_eq!(body["products"][0]["title"], "Premium Product A");
    assert_eq!(body["products"][0]["price"], 500_000_000u64);
}

#[tokio::test]
async fn get_product_by_id() {
    let (server, _) = server();

    let response = server.get("/api/products/2").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], "Product B");

    server
        .get("/api/products/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// POST /api/orders
// =============================================================================

#[tokio::test]
async fn order_carries_payment_request_for_merchant() {
    let merchant: Address = MERCHANT.parse().unwrap();
    let server = server_with(Arc::new(MapLedger::default()), Some(merchant));

    let response = server
        .post("/api/orders")
        .json(&json!({
            "items": [
                { "productId": "1", "quantity": 2 },
                { "productId": "2" }
            ],
            "idempotencyKey": "cart-7"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total"], 1_300_000_000u64);
    assert_eq!(body["totalDisplay"], "1.30 SOL");
    assert_eq!(body["order"]["lineItems"].as_array().unwrap().len(), 2);

    let request = &body["paymentRequest"];
    assert_eq!(request["recipient"], MERCHANT);
    assert_eq!(request["amount"], 1_300_000_000u64);
    assert_eq!(request["requestId"], "cart-7");
    assert_eq!(
        request["memo"],
        format!("order:{}", body["order"]["id"].as_str().unwrap())
    );
}

#[tokio::test]
async fn order_without_merchant_has_no_payment_request() {
    let (server, _) = server();

    let body: Value = server
        .post("/api/orders")
        .json(&json!({ "items": [{ "productId": "3" }] }))
        .await
        .json();

    assert_eq!(body["total"], 1_000_000_000u64);
    assert!(body["paymentRequest"].is_null());
}

#[tokio::test]
async fn order_validation() {
    let (server, _) = server();

    server
        .post("/api/orders")
        .json(&json!({ "items": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/orders")
        .json(&json!({ "items": [{ "productId": "missing" }] }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Product not found: missing");

    server
        .post("/api/orders")
        .json(&json!({ "items": [{ "productId": "1", "quantity": 0 }] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// GET /api/discover
// =============================================================================

#[tokio::test]
async fn discover_requires_query() {
    let (server, _) = server();

    let response = server.get("/api/discover").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Please enter a search query");

    server
        .get("/api/discover")
        .add_query_param("q", "   ")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discover_serves_mock_results_offline() {
    let (server, _) = server();

    let response = server.get("/api/discover").add_query_param("q", "lamp").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["source"], "mock");
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["products"][0]["title"], "lamp - Premium Product");
    assert_eq!(body["products"][0]["displayLink"], "example.com");
}
