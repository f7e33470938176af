//! End-to-end mint creation through the public API
//!
//! Uses its own ledger and wallet doubles: a ledger whose calls take time, and a
//! wallet that signs the raw message bytes and attaches the signature, the way a
//! browser wallet round-trip does.

use async_trait::async_trait;
use futures::StreamExt;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokenforge::ledger::{ConfirmationOutcome, LedgerConnection, LedgerError};
use tokenforge::mint::RawMintParams;
use tokenforge::tx_builder::TransactionEnvelope;
use tokenforge::wallet::{Wallet, WalletError};
use tokenforge::{AttemptStatus, MintError, MintPipeline, PipelineConfig, StatusReporter};

#[derive(Debug)]
struct DelayedLedger {
    delay: Duration,
    outcome: ConfirmationOutcome,
    submitted: Mutex<Vec<Transaction>>,
}

impl DelayedLedger {
    fn new(outcome: ConfirmationOutcome) -> Self {
        Self {
            delay: Duration::from_millis(20),
            outcome,
            submitted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LedgerConnection for DelayedLedger {
    async fn minimum_balance_for_rent_exemption(&self, size: usize) -> Result<u64, LedgerError> {
        tokio::time::sleep(self.delay).await;
        Ok((size as u64 + 128) * 6_960)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        tokio::time::sleep(self.delay).await;
        Ok(Hash::new_unique())
    }

    async fn submit_transaction(&self, wire: &[u8]) -> Result<Signature, LedgerError> {
        tokio::time::sleep(self.delay).await;
        let tx: Transaction =
            bincode::deserialize(wire).map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
        tx.verify()
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
        let signature = tx.signatures[0];
        self.submitted.lock().unwrap().push(tx);
        Ok(signature)
    }

    async fn await_confirmation(
        &self,
        _signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<ConfirmationOutcome, LedgerError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.outcome.clone())
    }
}

/// Signs detached message bytes, then attaches the result
struct DetachedSigningWallet {
    keypair: Keypair,
    approve: bool,
}

#[async_trait]
impl Wallet for DetachedSigningWallet {
    async fn is_connected(&self) -> bool {
        true
    }

    async fn address(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn cosign(
        &self,
        mut envelope: TransactionEnvelope,
    ) -> Result<TransactionEnvelope, WalletError> {
        if !self.approve {
            return Err(WalletError::Rejected("User rejected the request.".to_string()));
        }
        let message = envelope
            .message_bytes()
            .map_err(|e| WalletError::SigningFailed(e.to_string()))?;
        let signature = self.keypair.sign_message(&message);
        envelope
            .attach_signature(self.keypair.pubkey(), signature)
            .map_err(|e| WalletError::SigningFailed(e.to_string()))?;
        Ok(envelope)
    }
}

fn params() -> RawMintParams {
    RawMintParams {
        name: "Integration".to_string(),
        symbol: "INT".to_string(),
        decimals: "6".to_string(),
        initial_supply: "1000000".to_string(),
        freeze_enabled: true,
    }
}

fn setup(
    outcome: ConfirmationOutcome,
    approve: bool,
) -> (MintPipeline, Arc<DelayedLedger>, Pubkey) {
    let ledger = Arc::new(DelayedLedger::new(outcome));
    let keypair = Keypair::new();
    let payer = keypair.pubkey();
    let wallet = Arc::new(DetachedSigningWallet { keypair, approve });
    let pipeline = MintPipeline::new(
        ledger.clone(),
        wallet,
        PipelineConfig {
            record_metrics: false,
            ..PipelineConfig::default()
        },
    );
    (pipeline, ledger, payer)
}

#[tokio::test]
async fn test_end_to_end_with_detached_signature() {
    let (pipeline, ledger, payer) = setup(ConfirmationOutcome::Confirmed, true);
    let mut reporter = StatusReporter::new();

    let receipt = pipeline.create_mint(params(), &mut reporter).await.unwrap();

    let submitted = ledger.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    let tx = &submitted[0];
    assert_eq!(tx.message.account_keys[0], payer);
    assert_eq!(tx.message.account_keys[1], receipt.mint_address);
    assert_eq!(tx.signatures[0], receipt.transaction_signature);
    assert_eq!(tx.message.instructions.len(), 4);
}

#[tokio::test]
async fn test_stream_interleaves_with_slow_ledger() {
    let (pipeline, _, _) = setup(ConfirmationOutcome::Confirmed, true);

    let mut stream = pipeline.create_mint_stream(params());
    let mut seen = Vec::new();
    while let Some(status) = stream.next().await {
        seen.push(status);
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(seen[0], AttemptStatus::Validating);
    assert_eq!(seen[5], AttemptStatus::Confirming);
    assert!(matches!(seen[6], AttemptStatus::Succeeded(_)));
}

#[tokio::test]
async fn test_rejection_through_public_api() {
    let (pipeline, ledger, _) = setup(ConfirmationOutcome::Confirmed, false);
    let mut reporter = StatusReporter::new();

    let err = pipeline.create_mint(params(), &mut reporter).await.unwrap_err();

    assert!(matches!(err, MintError::WalletRejected(_)));
    assert!(ledger.submitted.lock().unwrap().is_empty());
    assert_eq!(
        reporter.current().to_string(),
        "Error (WalletRejected): User rejected the request: User rejected the request."
    );
}

#[tokio::test]
async fn test_timeout_is_distinct_from_failure() {
    let (pipeline, ledger, _) = setup(ConfirmationOutcome::TimedOut, true);
    let mut reporter = StatusReporter::new();

    let err = pipeline.create_mint(params(), &mut reporter).await.unwrap_err();

    assert_eq!(err.kind(), "ConfirmationTimeout");
    assert!(matches!(
        reporter.current(),
        AttemptStatus::ConfirmationTimeout(_)
    ));
    assert_eq!(ledger.submitted.lock().unwrap().len(), 1);
}
