//! Vault and share records.
//!
//! A [`VaultRecord`] exists for a denom while any shares of that vault are
//! outstanding. A [`VaultShareRecord`] exists for an (owner, denom) pair
//! while that owner holds shares. Neither record ever stores zero shares:
//! the keeper deletes a record in the same transaction that empties it.
//!
//! Total managed assets are deliberately absent from [`VaultRecord`]. The
//! strategy is asked for them on every conversion, so accrued yield is
//! reflected without any bookkeeping here.

use serde::{Deserialize, Serialize};

use crate::types::AccAddress;

/// Aggregate share supply of one vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    pub denom: String,
    pub total_shares: u128,
}

impl VaultRecord {
    /// An empty record for a vault's first deposit.
    pub fn new(denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            total_shares: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }
}

/// One account's shares in one vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultShareRecord {
    pub owner: AccAddress,
    pub denom: String,
    pub shares: u128,
}

impl VaultShareRecord {
    pub fn new(owner: AccAddress, denom: impl Into<String>) -> Self {
        Self {
            owner,
            denom: denom.into(),
            shares: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shares == 0
    }
}
