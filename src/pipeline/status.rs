//! Attempt status state machine
//!
//! The status reporter is the only externally observable progress signal of an
//! attempt. Transitions are totally ordered; none may be skipped or reordered:
//!
//! ```text
//! Idle -> Validating -> AwaitingRent -> Assembling -> AwaitingWalletSignature
//!      -> Submitting -> Confirming -> Succeeded | ConfirmationTimeout
//! ```
//!
//! `Failed` is reachable from every non-terminal state. Terminal states accept
//! nothing further. Each accepted transition is pushed to the subscriber (if any)
//! as it happens.

use chrono::{DateTime, Utc};
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::errors::MintError;

/// Outcome data for a created mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub mint_address: Pubkey,
    pub holding_account_address: Pubkey,
    pub transaction_signature: Signature,
}

/// Structured failure surfaced to the UI collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Taxonomy kind, e.g. `WalletRejected`
    pub kind: String,
    pub detail: String,
}

impl From<&MintError> for FailureReport {
    fn from(err: &MintError) -> Self {
        Self {
            kind: err.kind().to_string(),
            detail: err.detail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    Idle,
    Validating,
    AwaitingRent,
    Assembling,
    AwaitingWalletSignature,
    Submitting,
    Confirming,
    Succeeded(MintReceipt),
    /// Submitted but not observed in time; the transaction may still land
    ConfirmationTimeout(MintReceipt),
    Failed(FailureReport),
}

impl AttemptStatus {
    fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Validating => 1,
            Self::AwaitingRent => 2,
            Self::Assembling => 3,
            Self::AwaitingWalletSignature => 4,
            Self::Submitting => 5,
            Self::Confirming => 6,
            Self::Succeeded(_) | Self::ConfirmationTimeout(_) => 7,
            Self::Failed(_) => u8::MAX,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded(_) | Self::ConfirmationTimeout(_) | Self::Failed(_)
        )
    }

    /// Human-readable progress text
    pub fn message(&self) -> String {
        match self {
            Self::Idle => "Ready".to_string(),
            Self::Validating => "Validating parameters...".to_string(),
            Self::AwaitingRent => "Querying rent-exempt balance...".to_string(),
            Self::Assembling => "Preparing mint creation...".to_string(),
            Self::AwaitingWalletSignature => "Waiting for wallet signature...".to_string(),
            Self::Submitting => "Sending transaction...".to_string(),
            Self::Confirming => "Transaction sent. Confirming...".to_string(),
            Self::Succeeded(receipt) => format!(
                "Confirmed. Token created! Mint: {} Holding account: {} Transaction: {}",
                receipt.mint_address,
                receipt.holding_account_address,
                receipt.transaction_signature
            ),
            Self::ConfirmationTimeout(receipt) => format!(
                "Transaction {} was sent but not confirmed in time. It may still land; \
                 check the explorer before trying again.",
                receipt.transaction_signature
            ),
            Self::Failed(report) => format!("Error ({}): {}", report.kind, report.detail),
        }
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// One recorded transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub status: AttemptStatus,
    pub at: DateTime<Utc>,
}

/// Holds the status of one attempt and publishes every transition
#[derive(Debug)]
pub struct StatusReporter {
    current: AttemptStatus,
    history: Vec<StatusTransition>,
    subscriber: Option<mpsc::UnboundedSender<AttemptStatus>>,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter {
    /// Reporter without a subscriber; history is still recorded
    pub fn new() -> Self {
        Self {
            current: AttemptStatus::Idle,
            history: Vec::new(),
            subscriber: None,
        }
    }

    /// Reporter plus the receiving end for the UI collaborator
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AttemptStatus>) {
        let (tx, rx) = mpsc::unbounded();
        let reporter = Self {
            subscriber: Some(tx),
            ..Self::new()
        };
        (reporter, rx)
    }

    pub fn current(&self) -> &AttemptStatus {
        &self.current
    }

    pub fn history(&self) -> &[StatusTransition] {
        &self.history
    }

    /// Move to the immediate successor state
    pub fn advance(&mut self, next: AttemptStatus) -> Result<(), MintError> {
        let allowed = !self.current.is_terminal()
            && match &next {
                AttemptStatus::Failed(_) => true,
                AttemptStatus::Idle => false,
                other => other.rank() == self.current.rank() + 1,
            };
        if !allowed {
            return Err(MintError::Internal(format!(
                "illegal status transition {:?} -> {:?}",
                self.current, next
            )));
        }
        self.publish(next);
        Ok(())
    }

    /// Terminal failure from any non-terminal state
    pub fn fail(&mut self, err: &MintError) -> Result<(), MintError> {
        self.advance(AttemptStatus::Failed(FailureReport::from(err)))
    }

    fn publish(&mut self, status: AttemptStatus) {
        tracing::debug!(status = ?status, "Attempt status");
        if let Some(subscriber) = &self.subscriber {
            // a UI that stopped listening does not stop the attempt
            let _ = subscriber.unbounded_send(status.clone());
        }
        self.history.push(StatusTransition {
            status: status.clone(),
            at: Utc::now(),
        });
        self.current = status;
    }
}
