//! JSON-RPC ledger connection
//!
//! Thin adapter over the nonblocking `RpcClient`. Submission goes through the raw
//! `sendTransaction` call with base64 wire bytes, so the pipeline only ever hands
//! over the bytes it serialized itself. Confirmation polls signature statuses until
//! the configured timeout, then reports [`ConfirmationOutcome::TimedOut`].

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::request::RpcRequest;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash, signature::Signature};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{ConfirmationOutcome, LedgerConnection, LedgerError};
use crate::config::RpcConfig;

/// Ledger connection backed by a single JSON-RPC endpoint
pub struct RpcLedger {
    client: RpcClient,
    endpoint: String,
    commitment: CommitmentConfig,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("endpoint", &self.endpoint)
            .field("commitment", &self.commitment.commitment)
            .field("confirm_timeout", &self.confirm_timeout)
            .finish()
    }
}

impl RpcLedger {
    pub fn new(config: &RpcConfig) -> Result<Self, LedgerError> {
        let commitment = config
            .commitment_config()
            .map_err(|e| LedgerError::Configuration(e.to_string()))?;
        let client = RpcClient::new_with_timeout_and_commitment(
            config.url.clone(),
            config.timeout(),
            commitment,
        );
        Ok(Self {
            client,
            endpoint: config.url.clone(),
            commitment,
            confirm_timeout: config.confirm_timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LedgerConnection for RpcLedger {
    async fn minimum_balance_for_rent_exemption(
        &self,
        size_bytes: usize,
    ) -> Result<u64, LedgerError> {
        self.client
            .get_minimum_balance_for_rent_exemption(size_bytes)
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))
    }

    async fn submit_transaction(&self, wire_transaction: &[u8]) -> Result<Signature, LedgerError> {
        let encoded = BASE64_STANDARD.encode(wire_transaction);
        let params = json!([
            encoded,
            {
                "encoding": "base64",
                "skipPreflight": false,
                "preflightCommitment": self.commitment.commitment,
                // the pipeline never resubmits; neither should the node
                "maxRetries": 0,
            }
        ]);

        let signature: String = self
            .client
            .send(RpcRequest::SendTransaction, params)
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?;

        Signature::from_str(&signature).map_err(|e| {
            LedgerError::InvalidResponse(format!(
                "sendTransaction returned '{}': {}",
                signature, e
            ))
        })
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationOutcome, LedgerError> {
        let deadline = Instant::now() + self.confirm_timeout;

        loop {
            match self
                .client
                .get_signature_status_with_commitment(signature, commitment)
                .await
            {
                Ok(Some(Ok(()))) => return Ok(ConfirmationOutcome::Confirmed),
                Ok(Some(Err(tx_err))) => {
                    return Ok(ConfirmationOutcome::Failed(tx_err.to_string()))
                }
                Ok(None) => {
                    debug!(signature = %signature, "Signature not yet observed");
                }
                Err(e) => {
                    // a failed poll is not a failed transaction
                    warn!(
                        signature = %signature,
                        endpoint = %self.endpoint,
                        error = %e,
                        "Signature status poll failed"
                    );
                }
            }

            if Instant::now() >= deadline {
                return Ok(ConfirmationOutcome::TimedOut);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
