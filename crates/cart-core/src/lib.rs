//! # cart-core
//!
//! Core types and traits for the solcart storefront.
//!
//! This crate provides:
//! - `Product`, `ProductCatalog`, `Cart` and `Order` for the shop side
//! - `PaymentRequest`, `TransactionReceipt` and `CheckoutStatus` for a payment attempt
//! - `Address` and `UnsignedTransaction` for building transfers
//! - `LedgerClient` and `TransactionSigner` traits for the external collaborators
//! - `WalletSession`, the explicit wallet connection context
//! - `CheckoutVerifier`, the policy behind the verification endpoint
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{Cart, Order, ProductCatalog};
//!
//! let catalog = ProductCatalog::demo();
//! let mut cart = Cart::new();
//! cart.add_product(catalog.get("1").unwrap(), 2);
//!
//! let order = Order::from_cart(&cart)?;
//! let request = order.payment_request(merchant);
//!
//! // Hand the request to cart_solana::WalletCheckout::submit
//! ```

pub mod address;
pub mod amount;
pub mod cart;
pub mod error;
pub mod ledger;
pub mod order;
pub mod payment;
pub mod product;
pub mod transaction;
pub mod verification;
pub mod wallet;

// Re-exports for convenience
pub use address::Address;
pub use amount::{Lamports, LAMPORTS_PER_SOL};
pub use cart::{Cart, CartItem};
pub use error::{PaymentError, PaymentResult};
pub use ledger::{
    BoxedLedgerClient, ConfirmationRequest, LatestBlockhash, LedgerClient, LedgerTransaction,
    SignatureConfirmation, TransactionMeta,
};
pub use order::Order;
pub use payment::{
    CheckoutStatus, LoggingStatusObserver, PaymentRequest, StatusObserver, TransactionReceipt,
};
pub use product::{Product, ProductCatalog};
pub use transaction::{Blockhash, SignedTransaction, UnsignedTransaction};
pub use verification::{
    CheckoutRecord, CheckoutVerifier, RecordStatus, VerifiedTransaction, VerifyRequest,
    VerifyResponse, X402_METHOD,
};
pub use wallet::{BoxedSigner, TransactionSigner, WalletSession};
