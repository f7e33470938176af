//! Instruction planning and ordering validation
//!
//! A mint creation is always the same four instructions, in this order:
//! 1. `CreateAccount` - allocate and fund the mint account, owned by SPL Token
//! 2. `InitializeMint` - stamp decimals and authorities onto the new account
//! 3. `CreateAssociatedAccount` - create the wallet's holding account for the mint
//! 4. `MintToChecked` - credit the initial supply, re-stating decimals
//!
//! Each step depends on the post-state of the previous one, so the order is fixed
//! by construction: [`InstructionSet`] can only be built by
//! [`plan_mint_instructions`], and [`sanity_check_ix_order`] re-verifies the kinds in
//! debug/test builds.

use serde::{Deserialize, Serialize};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account,
};

use crate::mint::{MintSpec, RentQuote};
use crate::tx_builder::errors::TransactionBuilderError;

/// One ledger instruction of a mint creation, with its statically known fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintInstruction {
    CreateAccount {
        payer: Pubkey,
        new_account: Pubkey,
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },
    InitializeMint {
        mint: Pubkey,
        decimals: u8,
        mint_authority: Pubkey,
        freeze_authority: Option<Pubkey>,
    },
    CreateAssociatedAccount {
        payer: Pubkey,
        associated_account: Pubkey,
        wallet: Pubkey,
        mint: Pubkey,
        token_program: Pubkey,
    },
    MintToChecked {
        mint: Pubkey,
        destination: Pubkey,
        authority: Pubkey,
        amount: u64,
        decimals: u8,
    },
}

/// Discriminant of a [`MintInstruction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionKind {
    CreateAccount,
    InitializeMint,
    CreateAssociatedAccount,
    MintToChecked,
}

/// The only valid order
pub const MINT_INSTRUCTION_ORDER: [InstructionKind; 4] = [
    InstructionKind::CreateAccount,
    InstructionKind::InitializeMint,
    InstructionKind::CreateAssociatedAccount,
    InstructionKind::MintToChecked,
];

impl MintInstruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::CreateAccount { .. } => InstructionKind::CreateAccount,
            Self::InitializeMint { .. } => InstructionKind::InitializeMint,
            Self::CreateAssociatedAccount { .. } => InstructionKind::CreateAssociatedAccount,
            Self::MintToChecked { .. } => InstructionKind::MintToChecked,
        }
    }

    /// Lower into a ledger instruction
    pub fn to_instruction(&self) -> Result<Instruction, TransactionBuilderError> {
        match self {
            Self::CreateAccount {
                payer,
                new_account,
                lamports,
                space,
                owner,
            } => Ok(system_instruction::create_account(
                payer,
                new_account,
                *lamports,
                *space,
                owner,
            )),
            Self::InitializeMint {
                mint,
                decimals,
                mint_authority,
                freeze_authority,
            } => spl_token::instruction::initialize_mint(
                &spl_token::id(),
                mint,
                mint_authority,
                freeze_authority.as_ref(),
                *decimals,
            )
            .map_err(|e| TransactionBuilderError::instruction_failed("spl_token", e.to_string())),
            Self::CreateAssociatedAccount {
                payer,
                associated_account,
                wallet,
                mint,
                token_program,
            } => {
                let derived =
                    get_associated_token_address_with_program_id(wallet, mint, token_program);
                if derived != *associated_account {
                    return Err(TransactionBuilderError::instruction_failed(
                        "spl_associated_token_account",
                        format!(
                            "holding account {} is not the derived address {}",
                            associated_account, derived
                        ),
                    ));
                }
                Ok(create_associated_token_account(
                    payer,
                    wallet,
                    mint,
                    token_program,
                ))
            }
            Self::MintToChecked {
                mint,
                destination,
                authority,
                amount,
                decimals,
            } => spl_token::instruction::mint_to_checked(
                &spl_token::id(),
                mint,
                destination,
                authority,
                &[],
                *amount,
                *decimals,
            )
            .map_err(|e| TransactionBuilderError::instruction_failed("spl_token", e.to_string())),
        }
    }
}

/// Exactly four mint-creation instructions in the fixed order
///
/// Only [`plan_mint_instructions`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSet {
    instructions: [MintInstruction; 4],
    mint: Pubkey,
    holding_account: Pubkey,
}

impl InstructionSet {
    pub fn instructions(&self) -> &[MintInstruction; 4] {
        &self.instructions
    }

    pub fn kinds(&self) -> [InstructionKind; 4] {
        [
            self.instructions[0].kind(),
            self.instructions[1].kind(),
            self.instructions[2].kind(),
            self.instructions[3].kind(),
        ]
    }

    /// Address of the new mint
    pub fn mint(&self) -> Pubkey {
        self.mint
    }

    /// Derived associated holding account of the wallet for this mint
    pub fn holding_account(&self) -> Pubkey {
        self.holding_account
    }

    /// Lower all four into ledger instructions, preserving order
    pub fn to_instructions(&self) -> Result<Vec<Instruction>, TransactionBuilderError> {
        self.instructions
            .iter()
            .map(MintInstruction::to_instruction)
            .collect()
    }
}

/// Plan the four instructions that create `mint` and credit the wallet
///
/// # Arguments
///
/// * `spec` - Validated mint parameters
/// * `mint` - Address of the ephemeral mint identity
/// * `wallet` - Connected wallet; payer, mint authority and holding-account owner
/// * `rent` - Rent quote fetched for this attempt
///
/// # Errors
///
/// Returns `TransactionBuilderError::InstructionBuild` if the supply does not fit the
/// ledger's amount field (cannot happen for specs produced by `validate`).
pub fn plan_mint_instructions(
    spec: &MintSpec,
    mint: Pubkey,
    wallet: Pubkey,
    rent: &RentQuote,
) -> Result<InstructionSet, TransactionBuilderError> {
    let amount = spec.base_units().ok_or_else(|| {
        TransactionBuilderError::instruction_failed(
            "spl_token",
            format!(
                "initial supply {} with {} decimals overflows u64",
                spec.initial_supply, spec.decimals
            ),
        )
    })?;

    let token_program = spl_token::id();
    let holding_account = get_associated_token_address_with_program_id(&wallet, &mint, &token_program);

    let instructions = [
        MintInstruction::CreateAccount {
            payer: wallet,
            new_account: mint,
            lamports: rent.lamports_required,
            space: rent.account_size_bytes as u64,
            owner: token_program,
        },
        MintInstruction::InitializeMint {
            mint,
            decimals: spec.decimals,
            mint_authority: wallet,
            freeze_authority: spec.freeze_enabled.then_some(wallet),
        },
        MintInstruction::CreateAssociatedAccount {
            payer: wallet,
            associated_account: holding_account,
            wallet,
            mint,
            token_program,
        },
        MintInstruction::MintToChecked {
            mint,
            destination: holding_account,
            authority: wallet,
            amount,
            decimals: spec.decimals,
        },
    ];

    let set = InstructionSet {
        instructions,
        mint,
        holding_account,
    };
    sanity_check_ix_order(&set)?;
    Ok(set)
}

/// Validate instruction ordering (debug/test only)
///
/// Expected order: CreateAccount, InitializeMint, CreateAssociatedAccount,
/// MintToChecked, all referring to the same mint and the same holding account.
#[cfg(debug_assertions)]
pub fn sanity_check_ix_order(set: &InstructionSet) -> Result<(), TransactionBuilderError> {
    let kinds = set.kinds();
    if kinds != MINT_INSTRUCTION_ORDER {
        return Err(TransactionBuilderError::invalid_order(format!(
            "expected {:?}, got {:?}",
            MINT_INSTRUCTION_ORDER, kinds
        )));
    }

    for (idx, ix) in set.instructions.iter().enumerate() {
        let target = match ix {
            MintInstruction::CreateAccount { new_account, .. } => *new_account,
            MintInstruction::InitializeMint { mint, .. }
            | MintInstruction::CreateAssociatedAccount { mint, .. }
            | MintInstruction::MintToChecked { mint, .. } => *mint,
        };
        if target != set.mint {
            return Err(TransactionBuilderError::invalid_order(format!(
                "instruction {} targets {} instead of mint {}",
                idx, target, set.mint
            )));
        }

        let holding = match ix {
            MintInstruction::CreateAssociatedAccount {
                associated_account, ..
            } => Some(*associated_account),
            MintInstruction::MintToChecked { destination, .. } => Some(*destination),
            _ => None,
        };
        if let Some(holding) = holding.filter(|h| *h != set.holding_account) {
            return Err(TransactionBuilderError::invalid_order(format!(
                "instruction {} credits {} instead of holding account {}",
                idx, holding, set.holding_account
            )));
        }
    }

    Ok(())
}

/// No-op version of sanity_check_ix_order for release builds
#[cfg(not(debug_assertions))]
#[inline]
pub fn sanity_check_ix_order(_set: &InstructionSet) -> Result<(), TransactionBuilderError> {
    Ok(())
}
