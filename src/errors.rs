//! Error taxonomy for a mint creation attempt
//!
//! Every failure of an attempt maps onto exactly one [`MintError`] kind. The kind is
//! what the status reporter surfaces to the UI collaborator, together with the
//! detail text (node-provided text is carried verbatim).
//!
//! - **InvalidParameter**: local, user-correctable, raised before any network call
//! - **RentQueryFailed / BlockhashQueryFailed / SubmissionFailed**: remote I/O
//! - **WalletRejected**: user declined, or the wallet could not sign
//! - **SigningOrderViolation**: internal defect, never a recoverable case
//! - **TransactionFailed**: the ledger executed the transaction and it failed
//! - **ConfirmationTimeout**: outcome unknown; the transaction may still land

use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::tx_builder::TransactionBuilderError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    /// A user-supplied field (or the wallet precondition) is invalid
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter {
        /// Name of the offending field
        field: &'static str,
        reason: String,
    },

    /// The node could not quote the rent-exempt minimum
    #[error("Rent query failed: {0}")]
    RentQueryFailed(String),

    /// The node could not provide a recent blockhash
    #[error("Blockhash query failed: {0}")]
    BlockhashQueryFailed(String),

    /// The wallet declined to co-sign or is unable to sign
    #[error("Wallet rejected the transaction: {0}")]
    WalletRejected(String),

    /// The identity signature was requested before the message was final
    #[error("Signing order violation: {0}")]
    SigningOrderViolation(String),

    /// The node refused the transaction at submission
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// The transaction landed but its execution failed
    #[error("Transaction failed on-ledger: {0}")]
    TransactionFailed(String),

    /// Confirmation was not observed in time; the transaction may still land
    #[error("Confirmation not observed for {signature}; outcome unknown")]
    ConfirmationTimeout { signature: Signature },

    /// Unexpected internal state
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MintError {
    pub fn invalid_parameter(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Stable kind name for status reports and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::RentQueryFailed(_) => "RentQueryFailed",
            Self::BlockhashQueryFailed(_) => "BlockhashQueryFailed",
            Self::WalletRejected(_) => "WalletRejected",
            Self::SigningOrderViolation(_) => "SigningOrderViolation",
            Self::SubmissionFailed(_) => "SubmissionFailed",
            Self::TransactionFailed(_) => "TransactionFailed",
            Self::ConfirmationTimeout { .. } => "ConfirmationTimeout",
            Self::Internal(_) => "Internal",
        }
    }

    /// True only when the ledger outcome is unknown rather than failed
    pub fn is_outcome_uncertain(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. })
    }

    /// True when the user can fix the input and start a new attempt
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Detail text without the kind prefix
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidParameter { field, reason } => format!("{}: {}", field, reason),
            Self::RentQueryFailed(d)
            | Self::BlockhashQueryFailed(d)
            | Self::WalletRejected(d)
            | Self::SigningOrderViolation(d)
            | Self::SubmissionFailed(d)
            | Self::TransactionFailed(d)
            | Self::Internal(d) => d.clone(),
            Self::ConfirmationTimeout { signature } => format!(
                "transaction {} was submitted but not confirmed in time",
                signature
            ),
        }
    }
}

impl From<TransactionBuilderError> for MintError {
    fn from(err: TransactionBuilderError) -> Self {
        match err {
            TransactionBuilderError::SigningOrderViolation(msg) => {
                Self::SigningOrderViolation(msg)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MintError::invalid_parameter("decimals", "12 is outside 0..=9");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'decimals': 12 is outside 0..=9"
        );

        let err = MintError::SubmissionFailed("Blockhash not found".to_string());
        assert_eq!(err.to_string(), "Submission failed: Blockhash not found");
    }

    #[test]
    fn test_only_timeout_is_uncertain() {
        let timeout = MintError::ConfirmationTimeout {
            signature: Signature::default(),
        };
        assert!(timeout.is_outcome_uncertain());
        assert!(!MintError::SubmissionFailed("x".into()).is_outcome_uncertain());
        assert!(!MintError::WalletRejected("x".into()).is_outcome_uncertain());
    }

    #[test]
    fn test_kinds_and_correctability() {
        assert_eq!(MintError::RentQueryFailed("x".into()).kind(), "RentQueryFailed");
        assert!(MintError::invalid_parameter("wallet", "x").is_user_correctable());
        assert!(!MintError::Internal("x".into()).is_user_correctable());
    }

    #[test]
    fn test_builder_error_conversion() {
        let err: MintError =
            TransactionBuilderError::SigningOrderViolation("no blockhash".into()).into();
        assert!(matches!(err, MintError::SigningOrderViolation(_)));

        let err: MintError = TransactionBuilderError::internal("boom").into();
        assert_eq!(err.kind(), "Internal");
    }
}
