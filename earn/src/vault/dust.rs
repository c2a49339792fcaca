//! # Dust Policy
//!
//! Flooring in both conversion directions means a partial withdrawal can
//! leave an account with a handful of shares worth less than one unit of
//! the underlying asset. Those shares can never be redeemed for anything,
//! yet they would sit in the record store forever.
//!
//! After a withdrawal's shares are computed, [`apply`] checks the balance
//! that would remain. If it converts to less than
//! [`MIN_REDEEMABLE_ASSETS`], the withdrawal burns the whole balance
//! instead. The keeper then pays the floored value of the whole balance,
//! which is never more than the account actually owned.

use super::conversion::{ConversionError, ShareRate};
use crate::config::MIN_REDEEMABLE_ASSETS;

/// Whether `shares` is a non-zero balance worth less than one unit.
pub fn share_is_dust(rate: &ShareRate, shares: u128) -> Result<bool, ConversionError> {
    if shares == 0 {
        return Ok(false);
    }
    Ok(rate.to_assets(shares)? < MIN_REDEEMABLE_ASSETS)
}

/// Outcome of the dust check for one withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DustOutcome {
    /// The remaining balance is redeemable and stays.
    Kept { remaining: u128 },
    /// The remaining balance was dust and is burned with the withdrawal.
    Swept { residue: u128 },
}

/// Shares to burn for a withdrawal of `withdraw_shares` from `balance`.
///
/// Callers guarantee `withdraw_shares <= balance`.
pub fn apply(
    rate: &ShareRate,
    balance: u128,
    withdraw_shares: u128,
) -> Result<(u128, DustOutcome), ConversionError> {
    let remaining = balance.saturating_sub(withdraw_shares);
    if share_is_dust(rate, remaining)? {
        return Ok((balance, DustOutcome::Swept { residue: remaining }));
    }
    Ok((withdraw_shares, DustOutcome::Kept { remaining }))
}
