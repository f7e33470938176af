//! Streaming status interface

use futures::StreamExt;

use crate::ledger::ConfirmationOutcome;
use crate::pipeline::AttemptStatus;
use crate::test_utils::{FakeLedger, FakeWallet};

use super::{params, pipeline};

#[tokio::test]
async fn test_stream_yields_every_transition_then_ends() {
    let (pipeline, ledger, _) = pipeline(FakeLedger::new(), FakeWallet::signing());

    let statuses: Vec<AttemptStatus> = pipeline
        .create_mint_stream(params("6", "1000", false))
        .collect()
        .await;

    assert_eq!(statuses.len(), 7);
    assert_eq!(
        statuses[..6],
        [
            AttemptStatus::Validating,
            AttemptStatus::AwaitingRent,
            AttemptStatus::Assembling,
            AttemptStatus::AwaitingWalletSignature,
            AttemptStatus::Submitting,
            AttemptStatus::Confirming,
        ]
    );
    match &statuses[6] {
        AttemptStatus::Succeeded(receipt) => {
            assert_eq!(
                receipt.transaction_signature,
                ledger.submitted()[0].signatures[0]
            );
        }
        other => panic!("Expected Succeeded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_ends_after_failure() {
    let (pipeline, ledger, _) = pipeline(FakeLedger::new(), FakeWallet::disconnected());

    let statuses: Vec<AttemptStatus> = pipeline
        .create_mint_stream(params("6", "1000", false))
        .collect()
        .await;

    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0], AttemptStatus::Validating);
    match &statuses[1] {
        AttemptStatus::Failed(report) => assert_eq!(report.kind, "InvalidParameter"),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert_eq!(ledger.total_calls(), 0);
}

#[tokio::test]
async fn test_stream_reports_unknown_outcome() {
    let (pipeline, _, _) = pipeline(
        FakeLedger::new().with_confirmation(ConfirmationOutcome::TimedOut),
        FakeWallet::signing(),
    );

    let last = pipeline
        .create_mint_stream(params("2", "50", true))
        .collect::<Vec<_>>()
        .await
        .pop();

    match last {
        Some(status @ AttemptStatus::ConfirmationTimeout(_)) => {
            assert!(status.to_string().contains("may still land"));
        }
        other => panic!("Expected ConfirmationTimeout, got {:?}", other),
    }
}
