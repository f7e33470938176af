//! Transaction builder for mint creation
//!
//! ## Architecture
//!
//! - **errors**: error taxonomy for assembly and signing
//! - **instructions**: the closed set of mint-creation instructions and their order
//! - **envelope**: the single atomic transaction, its blockhash and its signatures
//!
//! ## Signing order
//!
//! The mint identity signs only after the instruction list and the recent blockhash
//! are both fixed. A signature over anything else could never verify on-ledger, so
//! the envelope refuses it with `SigningOrderViolation` instead of producing one.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tokenforge::mint::{validate, Identity, RawMintParams, RentQuote, MINT_ACCOUNT_SIZE};
//! use tokenforge::tx_builder::{plan_mint_instructions, TransactionEnvelope};
//! use solana_sdk::{hash::Hash, pubkey::Pubkey};
//!
//! # fn example(wallet: Pubkey, blockhash: Hash) -> Result<(), Box<dyn std::error::Error>> {
//! let spec = validate(&RawMintParams {
//!     decimals: "6".into(),
//!     initial_supply: "1000".into(),
//!     ..Default::default()
//! })?;
//! let identity = Identity::generate();
//! let rent = RentQuote { account_size_bytes: MINT_ACCOUNT_SIZE, lamports_required: 1_461_600 };
//!
//! let set = plan_mint_instructions(&spec, identity.address(), wallet, &rent)?;
//! let mut envelope = TransactionEnvelope::compose(set, wallet);
//! envelope.finalize(blockhash)?;
//! envelope.sign_with_identity(identity)?;
//! // hand `envelope` to the wallet for the fee payer signature
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod errors;
pub mod instructions;

pub use envelope::TransactionEnvelope;
pub use errors::TransactionBuilderError;
pub use instructions::{
    plan_mint_instructions, sanity_check_ix_order, InstructionKind, InstructionSet,
    MintInstruction, MINT_INSTRUCTION_ORDER,
};
