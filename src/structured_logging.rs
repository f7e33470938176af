//! Structured logging for mint creation attempts

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::errors::MintError;
use crate::observability::CorrelationId;

/// Structured logger for attempt lifecycle events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    attempt_id: CorrelationId,
}

impl StructuredLogger {
    pub fn new(attempt_id: CorrelationId) -> Self {
        Self { attempt_id }
    }

    pub fn attempt_id(&self) -> &CorrelationId {
        &self.attempt_id
    }

    pub fn log_attempt_started(&self, wallet: &Pubkey, decimals: u8, freeze_enabled: bool) {
        tracing::info!(
            attempt_id = %self.attempt_id,
            wallet = %wallet,
            decimals = decimals,
            freeze_enabled = freeze_enabled,
            "Mint creation attempt started"
        );
    }

    pub fn log_envelope_ready(&self, mint: &Pubkey, holding_account: &Pubkey, lamports: u64) {
        tracing::debug!(
            attempt_id = %self.attempt_id,
            mint = %mint,
            holding_account = %holding_account,
            rent_lamports = lamports,
            "Envelope assembled and signed by mint identity"
        );
    }

    pub fn log_submitted(&self, mint: &Pubkey, signature: &Signature) {
        tracing::info!(
            attempt_id = %self.attempt_id,
            mint = %mint,
            signature = %signature,
            "Mint transaction submitted"
        );
    }

    pub fn log_succeeded(&self, mint: &Pubkey, signature: &Signature, latency_ms: u64) {
        tracing::info!(
            attempt_id = %self.attempt_id,
            mint = %mint,
            signature = %signature,
            latency_ms = latency_ms,
            "Mint created"
        );
    }

    pub fn log_failed(&self, error: &MintError, latency_ms: u64) {
        if error.is_outcome_uncertain() {
            tracing::warn!(
                attempt_id = %self.attempt_id,
                kind = error.kind(),
                error = %error,
                latency_ms = latency_ms,
                "Mint creation outcome unknown"
            );
        } else {
            tracing::warn!(
                attempt_id = %self.attempt_id,
                kind = error.kind(),
                error = %error,
                latency_ms = latency_ms,
                "Mint creation failed"
            );
        }
    }
}
