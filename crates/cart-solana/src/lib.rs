//! # cart-solana
//!
//! Solana integration for solcart.
//!
//! ## Features
//!
//! - JSON-RPC `LedgerClient` (blockhash, submit, confirm, lookup)
//! - Wallet checkout flow with a status narrative
//! - Fire-and-forget verification notifier
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cart_solana::{RpcLedgerClient, SolanaConfig, WalletCheckout};
//! use std::sync::Arc;
//!
//! let config = SolanaConfig::from_env()?;
//! let ledger = Arc::new(RpcLedgerClient::new(&config)?);
//! let checkout = WalletCheckout::new(ledger);
//!
//! let receipt = checkout
//!     .submit_wallet_payment(&session, "So11111111111111111111111111111111111111112", 0.5)
//!     .await?;
//! ```

pub mod checkout;
pub mod config;
pub mod notify;
pub mod rpc;

pub use checkout::WalletCheckout;
pub use config::{Commitment, SolanaConfig, DEFAULT_RPC_URL};
pub use notify::{HttpVerificationNotifier, NotificationOutcome, VerificationNotifier};
pub use rpc::RpcLedgerClient;
