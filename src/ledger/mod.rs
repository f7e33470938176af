//! Ledger connection
//!
//! The pipeline talks to the ledger only through [`LedgerConnection`], injected as a
//! trait object so every step can be exercised against fakes. [`RpcLedger`] is the
//! JSON-RPC implementation used in production.

use async_trait::async_trait;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash, signature::Signature};

// Submodules
pub mod ledger_errors;
pub mod rpc_ledger;

// Re-exports for convenience
pub use ledger_errors::LedgerError;
pub use rpc_ledger::RpcLedger;

/// Result of waiting for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Observed at the requested commitment and executed successfully
    Confirmed,
    /// Observed, but execution failed on-ledger
    Failed(String),
    /// Not observed before the node-side timeout policy expired
    TimedOut,
}

/// Read-mostly handle to a ledger node
///
/// Every method is a suspension point of the pipeline. Implementations must not
/// retry submissions.
#[async_trait]
pub trait LedgerConnection: Send + Sync + std::fmt::Debug {
    /// Minimum lamports an account of `size_bytes` must hold to be rent-exempt
    async fn minimum_balance_for_rent_exemption(
        &self,
        size_bytes: usize,
    ) -> Result<u64, LedgerError>;

    /// A fresh recent blockhash
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Submit fully signed wire bytes once; returns the transaction signature
    async fn submit_transaction(&self, wire_transaction: &[u8]) -> Result<Signature, LedgerError>;

    /// Wait for `signature` to reach `commitment`
    async fn await_confirmation(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationOutcome, LedgerError>;
}
