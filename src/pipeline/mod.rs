//! Mint creation pipeline
//!
//! Drives one attempt from raw form input to a confirmed (or explicitly uncertain)
//! mint. The steps are strictly sequential because each consumes the previous
//! one's output:
//!
//! 1. wallet precondition and parameter validation (no network)
//! 2. rent-exempt quote
//! 3. identity generation, instruction assembly, fresh blockhash, identity signature
//! 4. wallet co-signature
//! 5. single submission
//! 6. single confirmation wait
//!
//! Every `.await` is a suspension point; nothing is spawned. Nothing is retried: a
//! failed attempt drops its identity and envelope, and a new attempt starts again
//! from validation.

pub mod status;

use futures::{
    future,
    stream::{self, BoxStream, StreamExt},
};
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use tracing::{warn, Instrument};

use crate::errors::MintError;
use crate::ledger::{ConfirmationOutcome, LedgerConnection};
use crate::metrics::{metrics, Timer};
use crate::mint::{require_connected, validate, Identity, RawMintParams, RentCalculator};
use crate::observability::CorrelationId;
use crate::structured_logging::StructuredLogger;
use crate::tx_builder::{plan_mint_instructions, TransactionEnvelope};
use crate::wallet::Wallet;

pub use status::{AttemptStatus, FailureReport, MintReceipt, StatusReporter, StatusTransition};

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Commitment requested when waiting for confirmation
    pub commitment: CommitmentConfig,
    /// Record attempt outcomes in the global Prometheus registry
    pub record_metrics: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            commitment: CommitmentConfig::confirmed(),
            record_metrics: true,
        }
    }
}

/// Mint creation pipeline with injected ledger and wallet collaborators
pub struct MintPipeline {
    ledger: Arc<dyn LedgerConnection>,
    wallet: Arc<dyn Wallet>,
    config: PipelineConfig,
}

impl MintPipeline {
    pub fn new(
        ledger: Arc<dyn LedgerConnection>,
        wallet: Arc<dyn Wallet>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            ledger,
            wallet,
            config,
        }
    }

    /// Run one attempt, reporting every transition through `reporter`
    ///
    /// On return the reporter is always in a terminal state.
    pub async fn create_mint(
        &self,
        params: RawMintParams,
        reporter: &mut StatusReporter,
    ) -> Result<MintReceipt, MintError> {
        let logger = StructuredLogger::new(CorrelationId::new());
        let span = tracing::info_span!("create_mint", attempt_id = %logger.attempt_id());

        async {
            let timer = Timer::new();
            if self.config.record_metrics {
                metrics().attempts_total.inc();
            }

            let result = self.run_attempt(params, reporter, &logger).await;

            match &result {
                Ok(receipt) => {
                    logger.log_succeeded(
                        &receipt.mint_address,
                        &receipt.transaction_signature,
                        timer.elapsed_ms(),
                    );
                }
                Err(err) => {
                    if !reporter.current().is_terminal() {
                        // cannot fail: the reporter is not terminal
                        let _ = reporter.fail(err);
                    }
                    logger.log_failed(err, timer.elapsed_ms());
                }
            }

            if self.config.record_metrics {
                self.record_outcome(&result, &timer);
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Run one attempt as a stream of status transitions
    ///
    /// The stream polls the attempt itself and ends after the terminal status.
    pub fn create_mint_stream(&self, params: RawMintParams) -> BoxStream<'_, AttemptStatus> {
        let (mut reporter, statuses) = StatusReporter::channel();
        let attempt = async move {
            let _ = self.create_mint(params, &mut reporter).await;
            // reporter dropped here, closing the channel
        };
        let driver =
            stream::once(attempt).filter_map(|()| future::ready(None::<AttemptStatus>));
        stream::select(driver, statuses).boxed()
    }

    async fn run_attempt(
        &self,
        params: RawMintParams,
        reporter: &mut StatusReporter,
        logger: &StructuredLogger,
    ) -> Result<MintReceipt, MintError> {
        reporter.advance(AttemptStatus::Validating)?;
        let wallet = require_connected(self.wallet.as_ref()).await?;
        let spec = validate(&params)?;
        logger.log_attempt_started(&wallet, spec.decimals, spec.freeze_enabled);

        reporter.advance(AttemptStatus::AwaitingRent)?;
        let rent = RentCalculator::quote(self.ledger.as_ref()).await?;

        reporter.advance(AttemptStatus::Assembling)?;
        let identity = Identity::generate();
        let instructions = plan_mint_instructions(&spec, identity.address(), wallet, &rent)?;
        let mint = instructions.mint();
        let holding_account = instructions.holding_account();
        let mut envelope = TransactionEnvelope::compose(instructions, wallet);

        let blockhash = self
            .ledger
            .latest_blockhash()
            .await
            .map_err(|e| MintError::BlockhashQueryFailed(e.to_string()))?;
        envelope.finalize(blockhash)?;
        envelope.sign_with_identity(identity)?;
        logger.log_envelope_ready(&mint, &holding_account, rent.lamports_required);

        reporter.advance(AttemptStatus::AwaitingWalletSignature)?;
        let envelope = self
            .wallet
            .cosign(envelope)
            .await
            .map_err(|e| MintError::WalletRejected(e.to_string()))?;
        let missing = envelope.missing_signers();
        if !missing.is_empty() {
            return Err(MintError::WalletRejected(format!(
                "wallet returned the transaction without signatures from {:?}",
                missing
            )));
        }

        reporter.advance(AttemptStatus::Submitting)?;
        let wire = envelope.serialize()?;
        let signature = self
            .ledger
            .submit_transaction(&wire)
            .await
            .map_err(|e| MintError::SubmissionFailed(e.to_string()))?;
        if envelope.transaction_signature() != Some(signature) {
            warn!(
                returned = %signature,
                "Node returned a signature different from the fee payer signature"
            );
        }
        logger.log_submitted(&mint, &signature);

        reporter.advance(AttemptStatus::Confirming)?;
        let receipt = MintReceipt {
            mint_address: mint,
            holding_account_address: holding_account,
            transaction_signature: signature,
        };

        match self
            .ledger
            .await_confirmation(&signature, self.config.commitment)
            .await
        {
            Ok(ConfirmationOutcome::Confirmed) => {
                reporter.advance(AttemptStatus::Succeeded(receipt.clone()))?;
                Ok(receipt)
            }
            Ok(ConfirmationOutcome::Failed(detail)) => Err(MintError::TransactionFailed(detail)),
            Ok(ConfirmationOutcome::TimedOut) => {
                reporter.advance(AttemptStatus::ConfirmationTimeout(receipt))?;
                Err(MintError::ConfirmationTimeout { signature })
            }
            Err(e) => {
                // the transaction is already in flight; a node error says nothing about it
                warn!(signature = %signature, error = %e, "Confirmation wait failed");
                reporter.advance(AttemptStatus::ConfirmationTimeout(receipt))?;
                Err(MintError::ConfirmationTimeout { signature })
            }
        }
    }

    fn record_outcome(&self, result: &Result<MintReceipt, MintError>, timer: &Timer) {
        let m = metrics();
        timer.observe_duration(&m.attempt_latency);
        match result {
            Ok(_) => m.attempts_succeeded.inc(),
            Err(err) if err.is_outcome_uncertain() => m.confirmation_timeouts.inc(),
            Err(err) => m.attempts_failed.with_label_values(&[err.kind()]).inc(),
        }
    }
}
