//! # Request Handlers
//!
//! Axum request handlers for the storefront API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cart_core::{Cart, Lamports, Order, PaymentError, PaymentRequest, VerifyRequest, VerifyResponse};
use cart_discovery::{DiscoveryError, DiscoveryResults};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create order request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Items to purchase
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Idempotency key (optional, generated when absent)
    #[serde(default)]
    pub idempotency_key: Option<String>,
    /// Custom metadata carried on the order
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Item in an order request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Create order response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: Order,
    pub total: Lamports,
    pub total_display: String,
    /// Transfer for the customer to sign; null when no merchant wallet is configured
    pub payment_request: Option<PaymentRequest>,
}

/// Discovery query string
#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let response = match &err {
        PaymentError::VerificationFailed(details) => {
            ErrorResponse::new("Failed to verify transaction", code).with_details(details.clone())
        }
        _ => ErrorResponse::new(err.to_string(), code),
    };
    (status(code), Json(response))
}

/// Parse a checkout body whatever its content type; bad bodies still get JSON errors
fn parse_verify_request(body: &[u8]) -> Result<VerifyRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        if e.is_syntax() || e.is_eof() {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid request: malformed JSON body", 400)
                    .with_details(e.to_string())),
            )
        } else {
            error!("Checkout body rejected: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", 500).with_details(e.to_string())),
            )
        }
    })
}

fn discovery_error_to_response(err: DiscoveryError) -> ApiError {
    let code = err.status_code();
    (status(code), Json(ErrorResponse::new(err.to_string(), code)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "solcart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Verify a wallet payment, stub an x402 payment, or acknowledge a checkout
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn checkout(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VerifyResponse>, ApiError> {
    let request = parse_verify_request(&body)?;
    let response = state.verifier.verify(&request).await.map_err(|e| {
        match &e {
            PaymentError::NotFound { tx_id } => info!("Transaction not found: {}", tx_id),
            _ => error!("Checkout error: {}", e),
        }
        payment_error_to_response(e)
    })?;

    Ok(Json(response))
}

/// Get products list
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<_> = state.catalog.active_products().collect();
    Json(serde_json::json!({
        "products": products,
        "count": products.len()
    }))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .catalog
        .get(&product_id)
        .ok_or_else(|| payment_error_to_response(PaymentError::ProductNotFound { product_id }))?;

    Ok(Json(product.clone()))
}

/// Build an order from catalog items and the payment request to settle it
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    if request.items.is_empty() {
        return Err(payment_error_to_response(PaymentError::InvalidRequest(
            "No items in order request".to_string(),
        )));
    }

    let mut cart = Cart::new();
    for item in &request.items {
        let product = state.catalog.get(&item.product_id).ok_or_else(|| {
            payment_error_to_response(PaymentError::ProductNotFound {
                product_id: item.product_id.clone(),
            })
        })?;

        if !product.active {
            return Err(payment_error_to_response(PaymentError::InvalidRequest(format!(
                "Product is not available: {}",
                item.product_id
            ))));
        }
        if item.quantity == 0 {
            return Err(payment_error_to_response(PaymentError::InvalidRequest(format!(
                "Quantity must be at least 1: {}",
                item.product_id
            ))));
        }

        cart.add_product(product, item.quantity);
    }

    let mut order = Order::from_cart(&cart).map_err(payment_error_to_response)?;
    if let Some(key) = request.idempotency_key {
        order = order.with_idempotency_key(key);
    }
    for (key, value) in request.metadata {
        order = order.with_metadata(key, value);
    }

    let total = order.total();
    let payment_request = state.merchant.map(|merchant| order.payment_request(merchant));

    info!(
        "Created order {}: {} items, total={}, payable={}",
        order.id,
        order.item_count(),
        total.display(),
        payment_request.is_some()
    );

    Ok(Json(CreateOrderResponse {
        order,
        total,
        total_display: total.display(),
        payment_request,
    }))
}

/// Discover products on the web
#[instrument(skip(state))]
pub async fn discover(
    State(state): State<AppState>,
    Query(params): Query<DiscoverParams>,
) -> Result<Json<DiscoveryResults>, ApiError> {
    let query = params.q.unwrap_or_default();
    let results = state.discovery.discover(&query).await.map_err(|e| {
        if !matches!(e, DiscoveryError::EmptyQuery | DiscoveryError::NoResults) {
            error!("Product discovery error: {}", e);
        }
        discovery_error_to_response(e)
    })?;

    Ok(Json(results))
}
