//! Error types for the transaction builder
//!
//! Covers instruction lowering, envelope composition and signing. These errors are
//! raised below the pipeline and folded into [`crate::errors::MintError`] there.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Error type for instruction assembly and envelope composition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionBuilderError {
    /// Failed to build an instruction for a specific program
    ///
    /// Contains the program name and detailed reason for failure
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program that failed to build an instruction
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// A signature was requested before the message was finalized
    ///
    /// Signing an unfinalized message would produce a signature the ledger can
    /// never verify, so this is always an error rather than a silent no-op.
    #[error("Signing order violation: {0}")]
    SigningOrderViolation(String),

    /// A signer produced an invalid signature or is not a required signer
    #[error("Signing failed for {signer}: {reason}")]
    Signing { signer: Pubkey, reason: String },

    /// Instruction kinds are not in the fixed mint-creation order
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// The envelope is not fully signed yet
    #[error("Missing signatures from {0:?}")]
    MissingSignatures(Vec<Pubkey>),

    /// Wire encoding failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Internal invariant violation or unexpected state
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransactionBuilderError {
    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::InstructionBuild { .. } => "instruction",
            Self::SigningOrderViolation(_) => "signing_order",
            Self::Signing { .. } => "signing",
            Self::InvalidInstructionOrder(_) => "validation",
            Self::MissingSignatures(_) => "signing",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }

    /// Create an instruction build error for a specific program
    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid instruction order error
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransactionBuilderError::InstructionBuild {
            program: "spl_token".to_string(),
            reason: "invalid decimals".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Instruction build error (program=spl_token): invalid decimals"
        );

        let err = TransactionBuilderError::SigningOrderViolation("no blockhash".to_string());
        assert_eq!(err.to_string(), "Signing order violation: no blockhash");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            TransactionBuilderError::instruction_failed("p", "r").category(),
            "instruction"
        );
        assert_eq!(
            TransactionBuilderError::invalid_order("x").category(),
            "validation"
        );
        assert_eq!(TransactionBuilderError::internal("x").category(), "internal");
    }
}
