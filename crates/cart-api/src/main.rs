//! # SolCart
//!
//! Demo storefront backend: catalog, orders, product discovery and Solana
//! payment verification.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: point at a cluster and a merchant wallet
//! export SOLANA_RPC_URL=https://api.devnet.solana.com
//! export MERCHANT_WALLET_ADDRESS=<base58 address>
//!
//! # Run the server
//! solcart
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();
    let base_url = state.config.base_url.trim_end_matches('/').to_string();

    info!("Environment: {}", state.config.environment);
    info!("Products loaded: {}", state.catalog.len());
    info!("Ledger endpoint: {}", state.rpc_url);
    info!("Discovery source: {}", state.discovery.source());
    match &state.merchant {
        Some(merchant) => info!("Merchant wallet: {}", merchant),
        None => warn!("MERCHANT_WALLET_ADDRESS not set; orders will carry no payment request"),
    }

    let app = routes::create_router(state);

    info!("🚀 SolCart starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: {}/health", base_url);
        info!("🛒 Orders: POST {}/api/orders", base_url);
        info!("✅ Verify: POST {}/api/checkout", base_url);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ◎ SolCart ◎
  ━━━━━━━━━━━━━━━━━━━━━━━
  Solana storefront demo
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
