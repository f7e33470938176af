//! Pipeline-level tests driven through the in-memory ledger and wallet

mod status_stream_tests;

use std::sync::Arc;

use crate::mint::RawMintParams;
use crate::pipeline::{MintPipeline, PipelineConfig};
use crate::test_utils::{FakeLedger, FakeWallet};

pub(crate) fn params(decimals: &str, supply: &str, freeze: bool) -> RawMintParams {
    RawMintParams {
        name: "Forge Token".to_string(),
        symbol: "FRG".to_string(),
        decimals: decimals.to_string(),
        initial_supply: supply.to_string(),
        freeze_enabled: freeze,
    }
}

pub(crate) fn pipeline(
    ledger: FakeLedger,
    wallet: FakeWallet,
) -> (MintPipeline, Arc<FakeLedger>, Arc<FakeWallet>) {
    let ledger = Arc::new(ledger);
    let wallet = Arc::new(wallet);
    let pipeline = MintPipeline::new(
        ledger.clone(),
        wallet.clone(),
        PipelineConfig {
            record_metrics: false,
            ..PipelineConfig::default()
        },
    );
    (pipeline, ledger, wallet)
}
