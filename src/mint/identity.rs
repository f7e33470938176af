//! Ephemeral mint identity
//!
//! A fresh keypair whose public half becomes the new mint's address. The secret half
//! signs the envelope exactly once and is dropped with the [`Identity`]; it is never
//! serialized, cloned or logged.

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

/// Single-use keypair for a new mint account
///
/// Deliberately neither `Clone` nor `Serialize`. The `Debug` output shows the
/// address only.
pub struct Identity {
    keypair: Keypair,
}

impl Identity {
    /// Generate a new identity from the operating system's secure RNG
    pub fn generate() -> Self {
        let identity = Self {
            keypair: Keypair::new(),
        };
        tracing::debug!(mint = %identity.address(), "Generated ephemeral mint identity");
        identity
    }

    /// The mint address this identity controls
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub(crate) fn signer(&self) -> &Keypair {
        &self.keypair
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl Drop for Identity {
    fn drop(&mut self) {
        tracing::trace!(mint = %self.keypair.pubkey(), "Ephemeral mint identity discarded");
    }
}
