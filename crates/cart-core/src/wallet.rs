//! # Wallet Session
//!
//! The signing capability belongs to a wallet the storefront does not
//! control (typically a browser extension). It is reached through the
//! `TransactionSigner` trait and held by an explicit `WalletSession`
//! that is connected on init and disconnected on teardown.

use crate::address::Address;
use crate::error::{PaymentError, PaymentResult};
use crate::transaction::{SignedTransaction, UnsignedTransaction};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// A connected identity able to sign transactions.
///
/// Implementations report a declined prompt as `PaymentError::UserRejected`.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Fee payer and source of funds
    fn public_key(&self) -> Address;

    /// Sign the transaction and return its wire bytes
    async fn sign_transaction(
        &self,
        transaction: UnsignedTransaction,
    ) -> PaymentResult<SignedTransaction>;

    /// Wallet name used in logs
    fn wallet_name(&self) -> &str {
        "wallet"
    }
}

/// Shared signer (dynamic dispatch)
pub type BoxedSigner = Arc<dyn TransactionSigner>;

/// Wallet connection context passed to the checkout flow.
#[derive(Clone, Default)]
pub struct WalletSession {
    signer: Option<BoxedSigner>,
}

impl WalletSession {
    /// A session with no wallet connected
    pub fn disconnected() -> Self {
        Self { signer: None }
    }

    /// A session connected to `signer`
    pub fn connected(signer: BoxedSigner) -> Self {
        let mut session = Self::disconnected();
        session.connect(signer);
        session
    }

    /// Attach a wallet, replacing any previous one
    pub fn connect(&mut self, signer: BoxedSigner) {
        info!(
            "Wallet connected: {} ({})",
            signer.public_key().short(),
            signer.wallet_name()
        );
        self.signer = Some(signer);
    }

    /// Detach the wallet
    pub fn disconnect(&mut self) {
        if let Some(signer) = self.signer.take() {
            info!("Wallet disconnected: {}", signer.public_key().short());
        }
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    /// The connected signer, or `NotConnected`
    pub fn signer(&self) -> PaymentResult<&BoxedSigner> {
        self.signer.as_ref().ok_or(PaymentError::NotConnected)
    }

    pub fn public_key(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.public_key())
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("public_key", &self.public_key())
            .finish()
    }
}
