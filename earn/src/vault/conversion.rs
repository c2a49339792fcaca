//! # Conversion Engine
//!
//! Pure integer math between asset amounts and share amounts.
//!
//! | Direction        | Formula                                   | Rounding |
//! |------------------|-------------------------------------------|----------|
//! | assets -> shares | `assets * total_shares / total_assets`    | floor    |
//! | shares -> assets | `shares * total_assets / total_shares`    | floor    |
//!
//! Both directions floor, so neither a deposit nor a withdrawal can ever
//! leave the vault owing more than its strategy holds. The cost is dust:
//! fractions of a unit that no single holder can claim (see
//! [`super::dust`]).
//!
//! The first deposit into an empty vault mints shares 1:1 with assets.

use sp_arithmetic::helpers_128bit::multiply_by_rational_with_rounding;
use sp_arithmetic::Rounding;
use thiserror::Error;

/// Conversion failures.
///
/// The two denominator cases mean stored state no longer describes a real
/// vault. They are fatal and must never be papered over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Shares are outstanding but the strategy reports nothing under
    /// management.
    #[error("invariant violation: {total_shares} shares outstanding against zero assets")]
    ZeroAssetsWithShares { total_shares: u128 },

    /// Converting a non-zero share amount for a vault with no shares.
    #[error("invariant violation: converting {shares} shares of a vault with zero total shares")]
    SharesWithoutSupply { shares: u128 },

    /// The converted amount does not fit in 128 bits.
    #[error("arithmetic overflow: {lhs} * {rhs} exceeds 128 bits after division")]
    Overflow { lhs: u128, rhs: u128 },
}

impl ConversionError {
    /// `true` for the fatal state-corruption cases.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ConversionError::ZeroAssetsWithShares { .. } | ConversionError::SharesWithoutSupply { .. }
        )
    }
}

fn mul_div_floor(value: u128, numerator: u128, denominator: u128) -> Result<u128, ConversionError> {
    // The product is formed in 256 bits; only a quotient above u128 fails.
    multiply_by_rational_with_rounding(value, numerator, denominator, Rounding::Down).ok_or(
        ConversionError::Overflow {
            lhs: value,
            rhs: numerator,
        },
    )
}

/// Shares minted for `assets`, floored.
pub fn convert_to_shares(
    assets: u128,
    total_assets: u128,
    total_shares: u128,
) -> Result<u128, ConversionError> {
    if total_shares == 0 {
        return Ok(assets);
    }
    if total_assets == 0 {
        return Err(ConversionError::ZeroAssetsWithShares { total_shares });
    }
    mul_div_floor(assets, total_shares, total_assets)
}

/// Assets redeemable for `shares`, floored.
pub fn convert_to_assets(
    shares: u128,
    total_assets: u128,
    total_shares: u128,
) -> Result<u128, ConversionError> {
    if shares == 0 {
        return Ok(0);
    }
    if total_shares == 0 {
        return Err(ConversionError::SharesWithoutSupply { shares });
    }
    mul_div_floor(shares, total_assets, total_shares)
}

/// A vault's conversion rate captured at one instant.
///
/// The keeper snapshots the rate once per operation so every conversion in
/// that operation sees the same totals, even after the strategy has moved
/// funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareRate {
    pub total_assets: u128,
    pub total_shares: u128,
}

impl ShareRate {
    pub fn new(total_assets: u128, total_shares: u128) -> Self {
        Self {
            total_assets,
            total_shares,
        }
    }

    pub fn to_shares(&self, assets: u128) -> Result<u128, ConversionError> {
        convert_to_shares(assets, self.total_assets, self.total_shares)
    }

    pub fn to_assets(&self, shares: u128) -> Result<u128, ConversionError> {
        convert_to_assets(shares, self.total_assets, self.total_shares)
    }
}
