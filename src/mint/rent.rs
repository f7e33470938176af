//! Rent-exempt balance for the new mint account

use serde::{Deserialize, Serialize};
use spl_token::{solana_program::program_pack::Pack, state::Mint};

use crate::errors::MintError;
use crate::ledger::LedgerConnection;

/// Byte size of an SPL Token mint account (82)
pub const MINT_ACCOUNT_SIZE: usize = Mint::LEN;

/// Rent figure for one attempt; never cached across attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentQuote {
    pub account_size_bytes: usize,
    pub lamports_required: u64,
}

pub struct RentCalculator;

impl RentCalculator {
    /// Query the node's current rent schedule for a mint-sized account
    pub async fn quote(ledger: &dyn LedgerConnection) -> Result<RentQuote, MintError> {
        let lamports_required = ledger
            .minimum_balance_for_rent_exemption(MINT_ACCOUNT_SIZE)
            .await
            .map_err(|e| MintError::RentQueryFailed(e.to_string()))?;

        tracing::debug!(
            size = MINT_ACCOUNT_SIZE,
            lamports = lamports_required,
            "Rent-exempt minimum quoted"
        );

        Ok(RentQuote {
            account_size_bytes: MINT_ACCOUNT_SIZE,
            lamports_required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeLedger;

    #[test]
    fn test_mint_size() {
        assert_eq!(MINT_ACCOUNT_SIZE, 82);
    }

    #[tokio::test]
    async fn test_quote_queries_mint_size() {
        let ledger = FakeLedger::new().with_rent(1_461_600);
        let quote = RentCalculator::quote(&ledger).await.unwrap();
        assert_eq!(quote.lamports_required, 1_461_600);
        assert_eq!(quote.account_size_bytes, 82);
        assert_eq!(ledger.rent_sizes_requested(), vec![82]);
    }

    #[tokio::test]
    async fn test_quote_failure_maps_to_rent_query_failed() {
        let ledger = FakeLedger::new().failing_rent("node is behind");
        let err = RentCalculator::quote(&ledger).await.unwrap_err();
        match err {
            MintError::RentQueryFailed(detail) => assert!(detail.contains("node is behind")),
            other => panic!("Expected RentQueryFailed, got {:?}", other),
        }
    }
}
