//! Test Utilities Module
//!
//! Deterministic in-memory stand-ins for the ledger node and the wallet, so the
//! pipeline can be driven step by step without network access.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ledger::{ConfirmationOutcome, LedgerConnection, LedgerError};
use crate::tx_builder::TransactionEnvelope;
use crate::wallet::{Wallet, WalletError};

const FAKE_ENDPOINT: &str = "fake://ledger";

/// In-memory ledger with scripted answers and call recording
#[derive(Debug)]
pub struct FakeLedger {
    rent: Result<u64, String>,
    blockhash: Result<Hash, String>,
    submit_error: Option<String>,
    confirmation: Result<ConfirmationOutcome, String>,

    calls: AtomicUsize,
    rent_sizes: Mutex<Vec<usize>>,
    submitted: Mutex<Vec<Transaction>>,
    confirmations_awaited: Mutex<Vec<(Signature, CommitmentConfig)>>,
}

impl Default for FakeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLedger {
    /// Ledger that answers every call successfully and confirms submissions
    pub fn new() -> Self {
        Self {
            rent: Ok(1_461_600),
            blockhash: Ok(Hash::new_from_array([7u8; 32])),
            submit_error: None,
            confirmation: Ok(ConfirmationOutcome::Confirmed),
            calls: AtomicUsize::new(0),
            rent_sizes: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            confirmations_awaited: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rent(mut self, lamports: u64) -> Self {
        self.rent = Ok(lamports);
        self
    }

    pub fn failing_rent(mut self, message: &str) -> Self {
        self.rent = Err(message.to_string());
        self
    }

    pub fn with_blockhash(mut self, blockhash: Hash) -> Self {
        self.blockhash = Ok(blockhash);
        self
    }

    pub fn failing_blockhash(mut self, message: &str) -> Self {
        self.blockhash = Err(message.to_string());
        self
    }

    pub fn failing_submit(mut self, message: &str) -> Self {
        self.submit_error = Some(message.to_string());
        self
    }

    pub fn with_confirmation(mut self, outcome: ConfirmationOutcome) -> Self {
        self.confirmation = Ok(outcome);
        self
    }

    pub fn failing_confirmation(mut self, message: &str) -> Self {
        self.confirmation = Err(message.to_string());
        self
    }

    /// Number of calls made through [`LedgerConnection`]
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rent_sizes_requested(&self) -> Vec<usize> {
        lock(&self.rent_sizes).clone()
    }

    /// Decoded transactions received by `submit_transaction`
    pub fn submitted(&self) -> Vec<Transaction> {
        lock(&self.submitted).clone()
    }

    pub fn confirmations_awaited(&self) -> Vec<(Signature, CommitmentConfig)> {
        lock(&self.confirmations_awaited).clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Node failure as the RPC client would surface it
fn transport(message: &str) -> LedgerError {
    LedgerError::classify(message, None, FAKE_ENDPOINT)
}

#[async_trait]
impl LedgerConnection for FakeLedger {
    async fn minimum_balance_for_rent_exemption(
        &self,
        size_bytes: usize,
    ) -> Result<u64, LedgerError> {
        self.record_call();
        lock(&self.rent_sizes).push(size_bytes);
        self.rent.clone().map_err(|m| transport(&m))
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.record_call();
        self.blockhash.clone().map_err(|m| transport(&m))
    }

    async fn submit_transaction(&self, wire_transaction: &[u8]) -> Result<Signature, LedgerError> {
        self.record_call();
        if let Some(message) = &self.submit_error {
            // preflight failures carry -32002
            return Err(LedgerError::classify(message, Some(-32002), FAKE_ENDPOINT));
        }
        let transaction: Transaction = bincode::deserialize(wire_transaction)
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
        if transaction.verify().is_err() {
            return Err(LedgerError::RpcResponse {
                endpoint: FAKE_ENDPOINT.to_string(),
                message: "Transaction signature verification failure".to_string(),
                code: Some(-32003),
            });
        }
        let signature = transaction.signatures[0];
        lock(&self.submitted).push(transaction);
        Ok(signature)
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationOutcome, LedgerError> {
        self.record_call();
        lock(&self.confirmations_awaited).push((*signature, commitment));
        self.confirmation.clone().map_err(|m| transport(&m))
    }
}

#[derive(Debug)]
enum WalletBehavior {
    Sign,
    Reject(String),
    Disconnected,
    NoAddress,
    /// Returns the envelope without adding a signature
    SkipSigning,
}

/// Wallet backed by an in-memory keypair with scripted behavior
#[derive(Debug)]
pub struct FakeWallet {
    keypair: Keypair,
    behavior: WalletBehavior,
    cosign_requests: AtomicUsize,
}

impl FakeWallet {
    /// Connected wallet that signs every request
    pub fn signing() -> Self {
        Self::with_behavior(WalletBehavior::Sign)
    }

    /// Connected wallet whose holder declines every request
    pub fn rejecting(reason: &str) -> Self {
        Self::with_behavior(WalletBehavior::Reject(reason.to_string()))
    }

    pub fn disconnected() -> Self {
        Self::with_behavior(WalletBehavior::Disconnected)
    }

    /// Connected wallet that does not expose a public key
    pub fn without_address() -> Self {
        Self::with_behavior(WalletBehavior::NoAddress)
    }

    /// Connected wallet that hands the envelope back unsigned
    pub fn not_signing() -> Self {
        Self::with_behavior(WalletBehavior::SkipSigning)
    }

    fn with_behavior(behavior: WalletBehavior) -> Self {
        Self {
            keypair: Keypair::new(),
            behavior,
            cosign_requests: AtomicUsize::new(0),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn cosign_requests(&self) -> usize {
        self.cosign_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    async fn is_connected(&self) -> bool {
        !matches!(self.behavior, WalletBehavior::Disconnected)
    }

    async fn address(&self) -> Option<Pubkey> {
        match self.behavior {
            WalletBehavior::NoAddress => None,
            _ => Some(self.keypair.pubkey()),
        }
    }

    async fn cosign(
        &self,
        mut envelope: TransactionEnvelope,
    ) -> Result<TransactionEnvelope, WalletError> {
        self.cosign_requests.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            WalletBehavior::Sign | WalletBehavior::NoAddress => {
                envelope
                    .sign_with(&self.keypair)
                    .map_err(|e| WalletError::SigningFailed(e.to_string()))?;
                Ok(envelope)
            }
            WalletBehavior::Reject(reason) => Err(WalletError::Rejected(reason.clone())),
            WalletBehavior::Disconnected => Err(WalletError::Disconnected),
            WalletBehavior::SkipSigning => Ok(envelope),
        }
    }
}
