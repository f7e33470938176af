//! Transaction envelope
//!
//! Wraps an [`InstructionSet`] into one atomic transaction: either the ledger applies
//! all four instructions or none of them.
//!
//! ## Lifecycle
//!
//! 1. [`TransactionEnvelope::compose`] - instructions and fee payer fixed, no blockhash
//! 2. [`TransactionEnvelope::finalize`] - recent blockhash fixed; message is final
//! 3. [`TransactionEnvelope::sign_with_identity`] - mint identity partial signature
//! 4. wallet co-signature via [`TransactionEnvelope::sign_with`] or
//!    [`TransactionEnvelope::attach_signature`]
//! 5. [`TransactionEnvelope::serialize`] - wire bytes, only once fully signed
//!
//! Any signature requested before step 2 is a [`TransactionBuilderError::SigningOrderViolation`].

use solana_sdk::{
    hash::Hash,
    message::Message,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::Transaction,
};
use std::collections::BTreeMap;

use crate::mint::Identity;
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::instructions::InstructionSet;

#[derive(Debug, Clone)]
pub struct TransactionEnvelope {
    instructions: InstructionSet,
    fee_payer: Pubkey,
    recent_blockhash: Option<Hash>,
    /// Present once finalized
    transaction: Option<Transaction>,
}

impl TransactionEnvelope {
    /// Compose an unfinalized envelope paid for by `fee_payer`
    pub fn compose(instructions: InstructionSet, fee_payer: Pubkey) -> Self {
        Self {
            instructions,
            fee_payer,
            recent_blockhash: None,
            transaction: None,
        }
    }

    /// Fix the recent blockhash and compile the final message
    ///
    /// Can only happen once: re-finalizing would invalidate collected signatures.
    pub fn finalize(&mut self, recent_blockhash: Hash) -> Result<(), TransactionBuilderError> {
        if self.transaction.is_some() {
            return Err(TransactionBuilderError::internal(
                "envelope is already finalized",
            ));
        }
        let instructions = self.instructions.to_instructions()?;
        let message = Message::new_with_blockhash(
            &instructions,
            Some(&self.fee_payer),
            &recent_blockhash,
        );
        self.transaction = Some(Transaction::new_unsigned(message));
        self.recent_blockhash = Some(recent_blockhash);
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn instructions(&self) -> &InstructionSet {
        &self.instructions
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.fee_payer
    }

    pub fn recent_blockhash(&self) -> Option<Hash> {
        self.recent_blockhash
    }

    /// Partially sign with the mint identity, consuming it
    ///
    /// The identity is dropped when this returns, on success and on error alike.
    pub fn sign_with_identity(&mut self, identity: Identity) -> Result<(), TransactionBuilderError> {
        if identity.address() != self.instructions.mint() {
            return Err(TransactionBuilderError::Signing {
                signer: identity.address(),
                reason: "identity does not own the mint address of this envelope".to_string(),
            });
        }
        self.sign_with(identity.signer())
    }

    /// Add the signature of any required signer
    pub fn sign_with(&mut self, signer: &dyn Signer) -> Result<(), TransactionBuilderError> {
        let signer_pubkey = signer.pubkey();
        let (transaction, blockhash) = self.finalized_mut("sign")?;
        transaction
            .try_partial_sign(&[signer], blockhash)
            .map_err(|e| TransactionBuilderError::Signing {
                signer: signer_pubkey,
                reason: e.to_string(),
            })
    }

    /// Bytes a signer must sign; only available once finalized
    pub fn message_bytes(&self) -> Result<Vec<u8>, TransactionBuilderError> {
        self.finalized("read message")
            .map(|tx| tx.message_data())
    }

    /// Attach a signature produced elsewhere (e.g. an external wallet)
    ///
    /// The signature must verify against the final message for `signer`.
    pub fn attach_signature(
        &mut self,
        signer: Pubkey,
        signature: Signature,
    ) -> Result<(), TransactionBuilderError> {
        let (transaction, _) = self.finalized_mut("attach a signature")?;
        let required = transaction.message.header.num_required_signatures as usize;
        let position = transaction.message.account_keys[..required]
            .iter()
            .position(|key| *key == signer)
            .ok_or_else(|| TransactionBuilderError::Signing {
                signer,
                reason: "not a required signer".to_string(),
            })?;

        if !signature.verify(signer.as_ref(), &transaction.message_data()) {
            return Err(TransactionBuilderError::Signing {
                signer,
                reason: "signature does not verify against the message".to_string(),
            });
        }
        transaction.signatures[position] = signature;
        Ok(())
    }

    /// Required signers and their signatures, `None` where still missing
    pub fn signatures(&self) -> BTreeMap<Pubkey, Option<Signature>> {
        let Some(transaction) = &self.transaction else {
            return BTreeMap::from([(self.fee_payer, None), (self.instructions.mint(), None)]);
        };
        let required = transaction.message.header.num_required_signatures as usize;
        transaction.message.account_keys[..required]
            .iter()
            .zip(transaction.signatures.iter())
            .map(|(key, sig)| (*key, (*sig != Signature::default()).then_some(*sig)))
            .collect()
    }

    /// Required signers that have not signed yet
    pub fn missing_signers(&self) -> Vec<Pubkey> {
        self.signatures()
            .into_iter()
            .filter_map(|(key, sig)| sig.is_none().then_some(key))
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.is_finalized() && self.missing_signers().is_empty()
    }

    /// The fee payer's signature, which identifies the transaction on-ledger
    pub fn transaction_signature(&self) -> Option<Signature> {
        self.transaction
            .as_ref()
            .and_then(|tx| tx.signatures.first().copied())
            .filter(|sig| *sig != Signature::default())
    }

    /// Wire bytes; refuses unless every required signer has signed
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionBuilderError> {
        let transaction = self.finalized("serialize")?;
        let missing = self.missing_signers();
        if !missing.is_empty() {
            return Err(TransactionBuilderError::MissingSignatures(missing));
        }
        bincode::serialize(transaction)
            .map_err(|e| TransactionBuilderError::Serialization(e.to_string()))
    }

    fn finalized(&self, action: &str) -> Result<&Transaction, TransactionBuilderError> {
        self.transaction.as_ref().ok_or_else(|| {
            TransactionBuilderError::SigningOrderViolation(format!(
                "cannot {} before the recent blockhash is fixed",
                action
            ))
        })
    }

    fn finalized_mut(
        &mut self,
        action: &str,
    ) -> Result<(&mut Transaction, Hash), TransactionBuilderError> {
        match (self.transaction.as_mut(), self.recent_blockhash) {
            (Some(tx), Some(hash)) => Ok((tx, hash)),
            _ => Err(TransactionBuilderError::SigningOrderViolation(format!(
                "cannot {} before the recent blockhash is fixed",
                action
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::{validate, RawMintParams, RentQuote, MINT_ACCOUNT_SIZE};
    use crate::tx_builder::instructions::plan_mint_instructions;
    use solana_sdk::signature::Keypair;

    fn envelope_for(identity: &Identity, wallet: &Keypair) -> TransactionEnvelope {
        let spec = validate(&RawMintParams {
            decimals: "6".to_string(),
            initial_supply: "1000".to_string(),
            ..RawMintParams::default()
        })
        .unwrap();
        let rent = RentQuote {
            account_size_bytes: MINT_ACCOUNT_SIZE,
            lamports_required: 1_461_600,
        };
        let set = plan_mint_instructions(&spec, identity.address(), wallet.pubkey(), &rent).unwrap();
        TransactionEnvelope::compose(set, wallet.pubkey())
    }

    #[test]
    fn test_signing_before_blockhash_is_violation() {
        let identity = Identity::generate();
        let wallet = Keypair::new();
        let mut envelope = envelope_for(&identity, &wallet);

        let err = envelope.sign_with_identity(identity).unwrap_err();
        assert!(matches!(err, TransactionBuilderError::SigningOrderViolation(_)));
        assert!(envelope.transaction_signature().is_none());
        assert!(matches!(
            envelope.message_bytes(),
            Err(TransactionBuilderError::SigningOrderViolation(_))
        ));
    }

    #[test]
    fn test_full_signing_flow() {
        let identity = Identity::generate();
        let mint = identity.address();
        let wallet = Keypair::new();
        let mut envelope = envelope_for(&identity, &wallet);

        envelope.finalize(Hash::new_unique()).unwrap();
        assert_eq!(envelope.missing_signers().len(), 2);

        envelope.sign_with_identity(identity).unwrap();
        assert_eq!(envelope.missing_signers(), vec![wallet.pubkey()]);
        assert!(envelope.signatures()[&mint].is_some());
        assert!(matches!(
            envelope.serialize(),
            Err(TransactionBuilderError::MissingSignatures(_))
        ));

        envelope.sign_with(&wallet).unwrap();
        assert!(envelope.is_fully_signed());
        let wire = envelope.serialize().unwrap();
        let decoded: Transaction = bincode::deserialize(&wire).unwrap();
        assert!(decoded.verify().is_ok());
        assert_eq!(decoded.message.account_keys[0], wallet.pubkey());
        assert_eq!(envelope.transaction_signature(), Some(decoded.signatures[0]));
    }

    #[test]
    fn test_attach_signature_verifies() {
        let identity = Identity::generate();
        let wallet = Keypair::new();
        let mut envelope = envelope_for(&identity, &wallet);
        envelope.finalize(Hash::new_unique()).unwrap();

        let bogus = Keypair::new().sign_message(&envelope.message_bytes().unwrap());
        assert!(envelope.attach_signature(wallet.pubkey(), bogus).is_err());

        let good = wallet.sign_message(&envelope.message_bytes().unwrap());
        envelope.attach_signature(wallet.pubkey(), good).unwrap();
        assert_eq!(envelope.transaction_signature(), Some(good));

        let stranger = Keypair::new();
        let sig = stranger.sign_message(&envelope.message_bytes().unwrap());
        assert!(envelope.attach_signature(stranger.pubkey(), sig).is_err());
    }

    #[test]
    fn test_foreign_identity_rejected() {
        let identity = Identity::generate();
        let wallet = Keypair::new();
        let mut envelope = envelope_for(&identity, &wallet);
        envelope.finalize(Hash::new_unique()).unwrap();

        let err = envelope.sign_with_identity(Identity::generate()).unwrap_err();
        assert!(matches!(err, TransactionBuilderError::Signing { .. }));
    }

    #[test]
    fn test_finalize_only_once() {
        let identity = Identity::generate();
        let wallet = Keypair::new();
        let mut envelope = envelope_for(&identity, &wallet);
        envelope.finalize(Hash::new_unique()).unwrap();
        assert!(envelope.finalize(Hash::new_unique()).is_err());
    }
}
