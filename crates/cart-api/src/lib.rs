//! # cart-api
//!
//! HTTP API layer for solcart.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The payment verification endpoint (with the x402 stub)
//! - Catalog, order and product discovery endpoints
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/checkout` | Verify a payment / x402 stub |
//! | GET | `/api/products` | List products |
//! | GET | `/api/products/{id}` | Get product |
//! | POST | `/api/orders` | Create order + payment request |
//! | GET | `/api/discover?q=` | Product discovery |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
