//! Record-store invariant checks.
//!
//! Run by tests after every operation and available to a host that wants to
//! audit state before committing. Each check returns the first breach it
//! finds as [`EarnError::InvariantViolation`].

use std::collections::BTreeMap;

use super::conversion::ShareRate;
use super::error::{EarnError, EarnResult};
use super::keeper::VaultKeeper;
use crate::storage::TxContext;

/// Run every check.
pub fn check_all(keeper: &VaultKeeper, ctx: &TxContext<'_>) -> EarnResult<()> {
    share_totals_match(ctx)?;
    no_empty_records(ctx)?;
    vaults_are_solvent(keeper, ctx)
}

/// Each vault's total equals the sum of its holders' shares, and no share
/// record exists without a vault record.
pub fn share_totals_match(ctx: &TxContext<'_>) -> EarnResult<()> {
    let mut sums: BTreeMap<String, u128> = BTreeMap::new();
    for record in ctx.all_vault_share_records()? {
        let sum = sums.entry(record.denom).or_default();
        *sum = sum.checked_add(record.shares).ok_or(EarnError::Overflow)?;
    }

    let totals: BTreeMap<String, u128> = ctx
        .vault_records()?
        .into_iter()
        .map(|r| (r.denom, r.total_shares))
        .collect();

    for (denom, sum) in &sums {
        match totals.get(denom) {
            None => {
                return Err(EarnError::InvariantViolation(format!(
                    "share records for {denom} without a vault record"
                )))
            }
            Some(total) if total != sum => {
                return Err(EarnError::InvariantViolation(format!(
                    "vault {denom} records {total} shares, holders own {sum}"
                )))
            }
            Some(_) => {}
        }
    }
    for (denom, total) in &totals {
        if !sums.contains_key(denom) {
            return Err(EarnError::InvariantViolation(format!(
                "vault {denom} records {total} shares with no holders"
            )));
        }
    }
    Ok(())
}

/// No stored record carries zero shares.
pub fn no_empty_records(ctx: &TxContext<'_>) -> EarnResult<()> {
    if let Some(record) = ctx.vault_records()?.iter().find(|r| r.is_empty()) {
        return Err(EarnError::InvariantViolation(format!(
            "vault record {} stored with zero shares",
            record.denom
        )));
    }
    if let Some(record) = ctx.all_vault_share_records()?.iter().find(|r| r.is_empty()) {
        return Err(EarnError::InvariantViolation(format!(
            "share record of {} in {} stored with zero shares",
            record.owner, record.denom
        )));
    }
    Ok(())
}

/// The floored value of every holder together never exceeds what the
/// vault's strategy holds.
pub fn vaults_are_solvent(keeper: &VaultKeeper, ctx: &TxContext<'_>) -> EarnResult<()> {
    for vault in ctx.vault_records()? {
        let total_assets = keeper.vault_total_value(ctx, &vault.denom)?.amount;
        let rate = ShareRate::new(total_assets, vault.total_shares);

        let mut owed = 0u128;
        for holder in ctx.vault_share_records(&vault.denom)? {
            owed = owed
                .checked_add(rate.to_assets(holder.shares)?)
                .ok_or(EarnError::Overflow)?;
        }
        if owed > total_assets {
            return Err(EarnError::InvariantViolation(format!(
                "vault {} owes {owed} but its strategy holds {total_assets}",
                vault.denom
            )));
        }
    }
    Ok(())
}
