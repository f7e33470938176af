//! TokenForge - Solana token mint creation library
//!
//! Turns a handful of user-entered parameters into a confirmed SPL token mint, with
//! the full initial supply credited to the creator's associated token account, in
//! one atomic transaction co-signed by a fresh mint identity and the user's wallet.

pub mod config;
pub mod errors;
pub mod ledger;
pub mod metrics;
pub mod mint;
pub mod observability;
pub mod pipeline;
pub mod structured_logging;
pub mod tx_builder;
pub mod wallet;

pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use errors::MintError;
pub use pipeline::{AttemptStatus, MintPipeline, MintReceipt, PipelineConfig, StatusReporter};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
