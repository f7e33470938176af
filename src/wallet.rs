//! Wallet management module
//!
//! The pipeline only sees the [`Wallet`] trait: connection state, an address, and a
//! co-sign request that the holder may refuse. [`WalletManager`] is the keypair-file
//! backed implementation used by the command line front end.

use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::tx_builder::TransactionEnvelope;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The holder declined to sign
    #[error("User rejected the request: {0}")]
    Rejected(String),

    /// The wallet cannot sign right now
    #[error("Wallet disconnected")]
    Disconnected,

    /// The wallet tried to sign and failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Externally held signer that pays for and co-signs the mint transaction
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn is_connected(&self) -> bool;

    /// Public key, if the wallet exposes one
    async fn address(&self) -> Option<Pubkey>;

    /// Add the wallet's signature to an envelope already signed by the mint identity
    async fn cosign(&self, envelope: TransactionEnvelope)
        -> Result<TransactionEnvelope, WalletError>;
}

/// Wallet manager for a local keypair
pub struct WalletManager {
    keypair: Arc<Keypair>,
    connected: AtomicBool,
}

impl WalletManager {
    /// Create a new wallet manager from a keypair file
    ///
    /// Accepts 64 raw bytes or the JSON byte-array format written by the Solana CLI.
    pub fn from_file(path: &str) -> Result<Self> {
        let path = expand_home(path);
        let keypair_bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read keypair file: {}", path))?;

        let keypair = if keypair_bytes.len() == 64 {
            // Raw bytes format - validate before conversion
            if keypair_bytes.iter().all(|&b| b == 0) {
                anyhow::bail!("Invalid keypair: all-zero key rejected");
            }
            Keypair::try_from(keypair_bytes.as_slice()).context("Invalid keypair bytes")?
        } else {
            // JSON format
            let json: Vec<u8> = serde_json::from_slice(&keypair_bytes)
                .context("Failed to parse keypair JSON")?;
            if json.len() != 64 {
                anyhow::bail!("Invalid keypair length: expected 64 bytes, got {}", json.len());
            }
            if json.iter().all(|&b| b == 0) {
                anyhow::bail!("Invalid keypair: all-zero key rejected");
            }
            Keypair::try_from(json.as_slice()).context("Invalid keypair from JSON")?
        };

        Ok(Self::from_keypair(keypair))
    }

    /// Create a new wallet manager from a keypair
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
            connected: AtomicBool::new(true),
        }
    }

    /// Get the public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Wallet for WalletManager {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn address(&self) -> Option<Pubkey> {
        Some(self.pubkey())
    }

    async fn cosign(
        &self,
        mut envelope: TransactionEnvelope,
    ) -> Result<TransactionEnvelope, WalletError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::Disconnected);
        }
        envelope
            .sign_with(self.keypair.as_ref())
            .map_err(|e| WalletError::SigningFailed(e.to_string()))?;
        Ok(envelope)
    }
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home, rest),
        _ => path.to_string(),
    }
}
