//! Mint parameters, identity and rent
//!
//! The leaf components of an attempt: validation of user input, generation of the
//! ephemeral mint identity, and the rent-exempt quote for the mint account.

pub mod identity;
pub mod rent;
pub mod spec;

pub use identity::Identity;
pub use rent::{RentCalculator, RentQuote, MINT_ACCOUNT_SIZE};
pub use spec::{base_units, require_connected, validate, whole_units, MintSpec, RawMintParams, TokenAmount};
