//! # Wallet Checkout
//!
//! Drives one wallet payment from request to confirmed signature:
//!
//! ```text
//! validate ─► Preparing ─► blockhash ─► Signing ─► Sending ─► Confirming ─► Succeeded
//!     │                                                                       │
//!     └──────────────────────────── Failed ◄──── any error ───────────────────┘
//! ```
//!
//! A confirmed payment is reported to the verification endpoint on a
//! detached task.

use crate::notify::VerificationNotifier;
use cart_core::{
    Blockhash, BoxedLedgerClient, CheckoutStatus, ConfirmationRequest, LoggingStatusObserver,
    PaymentError, PaymentRequest, PaymentResult, StatusObserver, TransactionReceipt,
    UnsignedTransaction, VerifyRequest, WalletSession,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Wallet payment submission flow
pub struct WalletCheckout {
    ledger: BoxedLedgerClient,
    observer: Arc<dyn StatusObserver>,
    notifier: Option<Arc<dyn VerificationNotifier>>,
}

impl WalletCheckout {
    /// Create a flow that logs status and sends no notifications
    pub fn new(ledger: BoxedLedgerClient) -> Self {
        Self {
            ledger,
            observer: Arc::new(LoggingStatusObserver),
            notifier: None,
        }
    }

    /// Builder: receive status updates
    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Builder: report confirmed payments
    pub fn with_notifier(mut self, notifier: Arc<dyn VerificationNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Pay `amount_sol` to `recipient` from the session's wallet.
    ///
    /// Fails with `NotConnected` or `InvalidRecipient` before touching the ledger.
    pub async fn submit_wallet_payment(
        &self,
        session: &WalletSession,
        recipient: &str,
        amount_sol: f64,
    ) -> PaymentResult<TransactionReceipt> {
        let request = session
            .signer()
            .and_then(|_| PaymentRequest::from_sol(recipient, amount_sol))
            .map_err(|e| self.fail(e))?;

        self.submit(session, &request).await
    }

    /// Sign, send and confirm a prepared payment request
    #[instrument(skip(self, session, request), fields(request_id = %request.request_id, lamports = request.amount.get()))]
    pub async fn submit(
        &self,
        session: &WalletSession,
        request: &PaymentRequest,
    ) -> PaymentResult<TransactionReceipt> {
        let receipt = self.run(session, request).await.map_err(|e| self.fail(e))?;

        match receipt.confirmed {
            Some(false) => {
                warn!("Transaction {} landed with an execution error", receipt.signature_id);
                self.emit(CheckoutStatus::Failed {
                    reason: format!(
                        "transaction {} failed on-chain",
                        receipt.signature_id
                    ),
                });
            }
            _ => {
                info!("Payment confirmed: {}", receipt.signature_id);
                self.emit(CheckoutStatus::Succeeded {
                    signature: receipt.signature_id.clone(),
                });
                self.spawn_notification(&receipt, request);
            }
        }

        Ok(receipt)
    }

    async fn run(
        &self,
        session: &WalletSession,
        request: &PaymentRequest,
    ) -> PaymentResult<TransactionReceipt> {
        let signer = session.signer()?;

        self.emit(CheckoutStatus::Preparing);
        let latest = self.ledger.get_latest_blockhash().await?;
        let blockhash: Blockhash = latest.blockhash.parse()?;
        let unsigned = UnsignedTransaction::transfer(signer.public_key(), request, blockhash)?;

        self.emit(CheckoutStatus::Signing);
        let signed = signer.sign_transaction(unsigned).await?;
        if !signed.is_signed() {
            return Err(PaymentError::UserRejected(format!(
                "{} returned an unsigned transaction",
                signer.wallet_name()
            )));
        }

        self.emit(CheckoutStatus::Sending);
        let signature = self.ledger.send_raw_transaction(signed.as_bytes()).await?;

        self.emit(CheckoutStatus::Confirming);
        let confirmation = self
            .ledger
            .confirm_transaction(&ConfirmationRequest {
                signature: signature.clone(),
                blockhash: latest.blockhash.clone(),
                last_valid_block_height: latest.last_valid_block_height,
            })
            .await?;

        Ok(TransactionReceipt {
            signature_id: signature,
            blockhash: latest.blockhash,
            last_valid_block_height: latest.last_valid_block_height,
            confirmed: Some(confirmation.err.is_none()),
        })
    }

    fn emit(&self, status: CheckoutStatus) {
        self.observer.on_status(&status);
    }

    fn fail(&self, err: PaymentError) -> PaymentError {
        error!("Payment failed: {}", err);
        self.emit(CheckoutStatus::Failed {
            reason: err.to_string(),
        });
        err
    }

    fn spawn_notification(&self, receipt: &TransactionReceipt, request: &PaymentRequest) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let notice =
            VerifyRequest::for_transaction(receipt.signature_id.clone(), Some(request.amount.as_sol()));

        tokio::spawn(async move {
            let outcome = notifier.notify(&notice).await;
            outcome.log(notice.tx_id.as_deref().unwrap_or_default());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationOutcome;
    use async_trait::async_trait;
    use cart_core::{
        Address, LatestBlockhash, LedgerClient, LedgerTransaction, Lamports,
        SignatureConfirmation, SignedTransaction, TransactionSigner,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Observer forwarding status updates over a channel
    struct ChannelStatusObserver {
        sender: tokio::sync::mpsc::UnboundedSender<CheckoutStatus>,
    }

    impl ChannelStatusObserver {
        fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<CheckoutStatus>) {
            let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
            (Self { sender }, receiver)
        }
    }

    impl StatusObserver for ChannelStatusObserver {
        fn on_status(&self, status: &CheckoutStatus) {
            // receiver gone means nobody is watching
            let _ = self.sender.send(status.clone());
        }
    }

    /// Forwards notifications to a channel instead of the network
    struct ChannelNotifier {
        sender: tokio::sync::mpsc::UnboundedSender<VerifyRequest>,
    }

    impl ChannelNotifier {
        fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<VerifyRequest>) {
            let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
            (Self { sender }, receiver)
        }
    }

    #[async_trait]
    impl VerificationNotifier for ChannelNotifier {
        async fn notify(&self, notice: &VerifyRequest) -> NotificationOutcome {
            match self.sender.send(notice.clone()) {
                Ok(()) => NotificationOutcome::Delivered { status: 200 },
                Err(e) => NotificationOutcome::Unreachable(e.to_string()),
            }
        }
    }

    const MERCHANT: &str = "So11111111111111111111111111111111111111112";
    const SIGNATURE: &str = "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

    #[derive(Clone, Copy)]
    enum Confirm {
        Ok,
        OnChainError,
        Expire,
    }

    struct MockLedger {
        calls: AtomicUsize,
        blockhash_calls: AtomicUsize,
        confirm: Confirm,
        sent: Mutex<Vec<Vec<u8>>>,
        confirmations: Mutex<Vec<ConfirmationRequest>>,
    }

    impl MockLedger {
        fn new(confirm: Confirm) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                blockhash_calls: AtomicUsize::new(0),
                confirm,
                sent: Mutex::new(Vec::new()),
                confirmations: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerClient for MockLedger {
        async fn get_latest_blockhash(&self) -> PaymentResult<LatestBlockhash> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
            Ok(LatestBlockhash {
                blockhash: Address::new([7u8; 32]).to_string(),
                last_valid_block_height: 1_000 + n as u64,
            })
        }

        async fn send_raw_transaction(&self, bytes: &[u8]) -> PaymentResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(bytes.to_vec());
            Ok(SIGNATURE.to_string())
        }

        async fn confirm_transaction(
            &self,
            request: &ConfirmationRequest,
        ) -> PaymentResult<SignatureConfirmation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.confirmations.lock().unwrap().push(request.clone());
            match self.confirm {
                Confirm::Ok => Ok(SignatureConfirmation { slot: 42, err: None }),
                Confirm::OnChainError => Ok(SignatureConfirmation {
                    slot: 42,
                    err: Some(serde_json::json!({"InstructionError": [0, "Custom"]})),
                }),
                Confirm::Expire => Err(PaymentError::Expired {
                    signature: request.signature.clone(),
                    last_valid_block_height: request.last_valid_block_height,
                }),
            }
        }

        async fn get_transaction(&self, _signature: &str) -> PaymentResult<Option<LedgerTransaction>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[derive(Clone, Copy)]
    enum Sign {
        Approve,
        Decline,
        Blank,
    }

    struct MockSigner {
        key: Address,
        behavior: Sign,
    }

    #[async_trait]
    impl TransactionSigner for MockSigner {
        fn public_key(&self) -> Address {
            self.key
        }

        async fn sign_transaction(
            &self,
            transaction: UnsignedTransaction,
        ) -> PaymentResult<SignedTransaction> {
            let mut bytes = transaction.to_bytes();
            match self.behavior {
                Sign::Approve => {
                    // one signature slot after the length prefix
                    bytes[1..65].fill(9);
                    Ok(SignedTransaction::new(bytes))
                }
                Sign::Decline => Err(PaymentError::UserRejected(
                    "User rejected the request".to_string(),
                )),
                Sign::Blank => Ok(SignedTransaction::new(bytes)),
            }
        }
    }

    fn session(behavior: Sign) -> WalletSession {
        WalletSession::connected(Arc::new(MockSigner {
            key: Address::new([3u8; 32]),
            behavior,
        }))
    }

    fn checkout(
        ledger: Arc<MockLedger>,
    ) -> (WalletCheckout, tokio::sync::mpsc::UnboundedReceiver<CheckoutStatus>) {
        let (observer, statuses) = ChannelStatusObserver::new();
        let checkout = WalletCheckout::new(ledger).with_observer(Arc::new(observer));
        (checkout, statuses)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<CheckoutStatus>) -> Vec<CheckoutStatus> {
        let mut out = Vec::new();
        while let Ok(status) = rx.try_recv() {
            out.push(status);
        }
        out
    }

    #[tokio::test]
    async fn test_not_connected_fails_before_network() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, mut statuses) = checkout(ledger.clone());

        let err = checkout
            .submit_wallet_payment(&WalletSession::disconnected(), MERCHANT, 0.5)
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::NotConnected);
        assert_eq!(ledger.calls(), 0);
        assert_eq!(
            drain(&mut statuses),
            vec![CheckoutStatus::Failed {
                reason: "Wallet not connected".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_network() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, _statuses) = checkout(ledger.clone());

        let err = checkout
            .submit_wallet_payment(&session(Sign::Approve), "", 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRecipient(_)));

        let err = checkout
            .submit_wallet_payment(&session(Sign::Approve), "not-base58-0OIl", 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRecipient(_)));

        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_payment() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, mut statuses) = checkout(ledger.clone());

        let receipt = checkout
            .submit_wallet_payment(&session(Sign::Approve), MERCHANT, 0.5)
            .await
            .unwrap();

        assert_eq!(receipt.signature_id, SIGNATURE);
        assert_eq!(receipt.blockhash, Address::new([7u8; 32]).to_string());
        assert_eq!(receipt.last_valid_block_height, 1_000);
        assert_eq!(receipt.confirmed, Some(true));

        // confirmation waits on the same blockhash the transaction was built with
        let confirmations = ledger.confirmations.lock().unwrap().clone();
        assert_eq!(confirmations.len(), 1);
        assert_eq!(confirmations[0].blockhash, receipt.blockhash);
        assert_eq!(confirmations[0].last_valid_block_height, 1_000);

        let sent = ledger.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(SignedTransaction::new(sent[0].clone()).is_signed());

        assert_eq!(
            drain(&mut statuses),
            vec![
                CheckoutStatus::Preparing,
                CheckoutStatus::Signing,
                CheckoutStatus::Sending,
                CheckoutStatus::Confirming,
                CheckoutStatus::Succeeded {
                    signature: SIGNATURE.to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_user_rejection_stops_before_send() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, mut statuses) = checkout(ledger.clone());

        let err = checkout
            .submit_wallet_payment(&session(Sign::Decline), MERCHANT, 0.5)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::UserRejected(_)));
        assert!(ledger.sent.lock().unwrap().is_empty());

        let last = drain(&mut statuses).pop().unwrap();
        assert!(matches!(last, CheckoutStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_unsigned_result_is_rejection() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, _statuses) = checkout(ledger.clone());

        let err = checkout
            .submit_wallet_payment(&session(Sign::Blank), MERCHANT, 0.5)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::UserRejected(_)));
        assert!(ledger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_blockhash() {
        let ledger = MockLedger::new(Confirm::Expire);
        let (checkout, mut statuses) = checkout(ledger);

        let err = checkout
            .submit_wallet_payment(&session(Sign::Approve), MERCHANT, 0.5)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Expired { .. }));
        assert!(err.is_retryable());
        assert!(matches!(
            drain(&mut statuses).pop(),
            Some(CheckoutStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_on_chain_error_reported_unconfirmed() {
        let ledger = MockLedger::new(Confirm::OnChainError);
        let (checkout, mut statuses) = checkout(ledger);

        let receipt = checkout
            .submit_wallet_payment(&session(Sign::Approve), MERCHANT, 0.5)
            .await
            .unwrap();

        assert_eq!(receipt.confirmed, Some(false));
        assert!(matches!(
            drain(&mut statuses).pop(),
            Some(CheckoutStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_fresh_blockhash_per_attempt() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, _statuses) = checkout(ledger.clone());
        let session = session(Sign::Approve);

        let first = checkout.submit_wallet_payment(&session, MERCHANT, 0.1).await.unwrap();
        let second = checkout.submit_wallet_payment(&session, MERCHANT, 0.1).await.unwrap();

        assert_eq!(ledger.blockhash_calls.load(Ordering::SeqCst), 2);
        assert_ne!(first.last_valid_block_height, second.last_valid_block_height);
    }

    #[tokio::test]
    async fn test_prepared_request_is_submitted_as_is() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (checkout, _statuses) = checkout(ledger.clone());

        let request = PaymentRequest::new(MERCHANT.parse().unwrap(), Lamports(1_300_000_000))
            .with_memo("order:abc");
        checkout.submit(&session(Sign::Approve), &request).await.unwrap();

        let sent = ledger.sent.lock().unwrap().clone();
        let bytes = &sent[0];
        // transfer data carries the exact lamport amount
        let amount = 1_300_000_000u64.to_le_bytes();
        assert!(bytes.windows(8).any(|w| w == amount));
        assert!(bytes.windows(9).any(|w| w == b"order:abc"));
    }

    #[tokio::test]
    async fn test_confirmed_payment_is_reported() {
        let ledger = MockLedger::new(Confirm::Ok);
        let (notifier, mut notices) = ChannelNotifier::new();
        let checkout = WalletCheckout::new(ledger).with_notifier(Arc::new(notifier));

        checkout
            .submit_wallet_payment(&session(Sign::Approve), MERCHANT, 0.5)
            .await
            .unwrap();

        let notice = tokio::time::timeout(Duration::from_secs(1), notices.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(notice.tx_id.as_deref(), Some(SIGNATURE));
        assert_eq!(notice.amount, Some(serde_json::json!(0.5)));
    }

    #[tokio::test]
    async fn test_on_chain_failure_is_not_reported() {
        let ledger = MockLedger::new(Confirm::OnChainError);
        let (notifier, mut notices) = ChannelNotifier::new();
        let checkout = WalletCheckout::new(ledger).with_notifier(Arc::new(notifier));

        let receipt = checkout
            .submit_wallet_payment(&session(Sign::Approve), MERCHANT, 0.5)
            .await
            .unwrap();
        assert_eq!(receipt.confirmed, Some(false));

        // closes once the last notifier handle is gone
        drop(checkout);
        assert!(notices.recv().await.is_none());
    }

    struct FailingNotifier;

    #[async_trait]
    impl VerificationNotifier for FailingNotifier {
        async fn notify(&self, _notice: &VerifyRequest) -> NotificationOutcome {
            NotificationOutcome::Rejected {
                status: 500,
                body: "boom".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_notification_does_not_fail_payment() {
        let ledger = MockLedger::new(Confirm::Ok);
        let checkout = WalletCheckout::new(ledger).with_notifier(Arc::new(FailingNotifier));

        let receipt = checkout
            .submit_wallet_payment(&session(Sign::Approve), MERCHANT, 0.5)
            .await
            .unwrap();
        assert_eq!(receipt.confirmed, Some(true));
    }
}
