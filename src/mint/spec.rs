//! Parameter validation
//!
//! Turns raw form fields into a typed [`MintSpec`]. Validation is all-or-nothing:
//! either every field is accepted and a spec is produced, or the first offending
//! field is reported through [`MintError::InvalidParameter`].
//!
//! ## Supply conversion policy
//!
//! The human-readable supply is parsed exactly from its text (no floating point).
//! Base units are `floor(supply) * 10^decimals`; any fractional part is truncated,
//! never rounded. A spec whose base-unit amount would not fit the ledger's `u64`
//! amount field is rejected here, before any network call.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::errors::MintError;
use crate::wallet::Wallet;

/// Largest decimals value accepted by the SPL Token program for this flow
pub const MAX_DECIMALS: u8 = 9;

/// Raw, unparsed user input as it arrives from the form collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMintParams {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    pub initial_supply: String,
    pub freeze_enabled: bool,
}

/// Validated mint parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintSpec {
    /// Cosmetic only; not written on-ledger by this crate
    pub name: String,
    /// Cosmetic only; not written on-ledger by this crate
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: TokenAmount,
    pub freeze_enabled: bool,
}

impl MintSpec {
    /// Initial supply in base units, `None` if it does not fit in `u64`
    ///
    /// Always `Some` for specs produced by [`validate`].
    pub fn base_units(&self) -> Option<u64> {
        base_units(self.initial_supply.whole, self.decimals)
    }
}

/// A non-negative human-readable decimal amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Integer part
    pub whole: u64,
    /// Digits after the decimal point, exactly as typed (may be empty)
    pub fraction: String,
}

impl TokenAmount {
    /// Parse a plain decimal string: `[+]digits[.digits]` or `.digits`
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("value is empty".to_string());
        }
        if trimmed.starts_with('-') {
            return Err("must be non-negative".to_string());
        }
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let (whole_str, fraction) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };

        if whole_str.is_empty() && fraction.is_empty() {
            return Err(format!("'{}' is not a number", trimmed));
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole_str) || !all_digits(fraction) {
            return Err(format!("'{}' is not a finite plain decimal", trimmed));
        }

        let whole = if whole_str.is_empty() {
            0
        } else {
            whole_str
                .parse::<u64>()
                .map_err(|_| format!("'{}' exceeds the supported range", trimmed))?
        };

        Ok(Self {
            whole,
            fraction: fraction.to_string(),
        })
    }

    /// Whether any nonzero fractional digits will be dropped by conversion
    pub fn has_truncated_fraction(&self) -> bool {
        self.fraction.bytes().any(|b| b != b'0')
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fraction.is_empty() {
            write!(f, "{}", self.whole)
        } else {
            write!(f, "{}.{}", self.whole, self.fraction)
        }
    }
}

/// `whole * 10^decimals`, or `None` on overflow
pub fn base_units(whole: u64, decimals: u8) -> Option<u64> {
    10u64
        .checked_pow(u32::from(decimals))
        .and_then(|scale| whole.checked_mul(scale))
}

/// Inverse of [`base_units`]: whole human-readable units, truncated
pub fn whole_units(base_units: u64, decimals: u8) -> u64 {
    match 10u64.checked_pow(u32::from(decimals)) {
        Some(scale) => base_units / scale,
        None => 0,
    }
}

/// Validate raw form input into a [`MintSpec`]
pub fn validate(raw: &RawMintParams) -> Result<MintSpec, MintError> {
    let decimals = parse_decimals(&raw.decimals)?;

    let initial_supply = TokenAmount::parse(&raw.initial_supply)
        .map_err(|reason| MintError::invalid_parameter("initial_supply", reason))?;

    if base_units(initial_supply.whole, decimals).is_none() {
        return Err(MintError::invalid_parameter(
            "initial_supply",
            format!(
                "{} with {} decimals overflows the 64-bit amount field",
                initial_supply, decimals
            ),
        ));
    }

    if initial_supply.has_truncated_fraction() {
        tracing::debug!(
            supply = %initial_supply,
            "Fractional initial supply will be truncated"
        );
    }

    Ok(MintSpec {
        name: raw.name.clone(),
        symbol: raw.symbol.clone(),
        decimals,
        initial_supply,
        freeze_enabled: raw.freeze_enabled,
    })
}

fn parse_decimals(input: &str) -> Result<u8, MintError> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|_| {
        MintError::invalid_parameter("decimals", format!("'{}' is not an integer", trimmed))
    })?;
    if !(0..=i64::from(MAX_DECIMALS)).contains(&value) {
        return Err(MintError::invalid_parameter(
            "decimals",
            format!("{} is outside 0..={}", value, MAX_DECIMALS),
        ));
    }
    // bounded above
    Ok(value as u8)
}

/// Attempt precondition: the wallet must be connected and expose an address
///
/// Runs before validation so a disconnected wallet never reaches the network.
pub async fn require_connected(wallet: &dyn Wallet) -> Result<Pubkey, MintError> {
    if !wallet.is_connected().await {
        return Err(MintError::invalid_parameter(
            "wallet",
            "wallet is not connected",
        ));
    }
    wallet
        .address()
        .await
        .ok_or_else(|| MintError::invalid_parameter("wallet", "wallet has no address"))
}
