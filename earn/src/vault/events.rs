//! Vault events.
//!
//! Emitted into the [`TxContext`](crate::storage::TxContext) and handed to
//! the host on commit for downstream indexing. Nothing in the engine reads
//! them back.

use serde::{Deserialize, Serialize};

use crate::config::{
    ATTRIBUTE_KEY_AMOUNT, ATTRIBUTE_KEY_HOLDERS, ATTRIBUTE_KEY_OWNER, ATTRIBUTE_KEY_SHARES,
    ATTRIBUTE_KEY_VAULT_DENOM, EVENT_TYPE_VAULT_DEPOSIT, EVENT_TYPE_VAULT_LIQUIDATE,
    EVENT_TYPE_VAULT_WITHDRAW,
};
use crate::types::AccAddress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    Deposit {
        denom: String,
        owner: AccAddress,
        shares: u128,
        amount: u128,
    },
    Withdraw {
        denom: String,
        owner: AccAddress,
        shares: u128,
        amount: u128,
    },
    /// A vault was decommissioned and its holders paid out.
    Liquidate {
        denom: String,
        amount: u128,
        holders: usize,
    },
}

impl VaultEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            VaultEvent::Deposit { .. } => EVENT_TYPE_VAULT_DEPOSIT,
            VaultEvent::Withdraw { .. } => EVENT_TYPE_VAULT_WITHDRAW,
            VaultEvent::Liquidate { .. } => EVENT_TYPE_VAULT_LIQUIDATE,
        }
    }

    pub fn denom(&self) -> &str {
        match self {
            VaultEvent::Deposit { denom, .. }
            | VaultEvent::Withdraw { denom, .. }
            | VaultEvent::Liquidate { denom, .. } => denom,
        }
    }

    /// Flat key/value attributes, in emission order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            VaultEvent::Deposit {
                denom,
                owner,
                shares,
                amount,
            }
            | VaultEvent::Withdraw {
                denom,
                owner,
                shares,
                amount,
            } => vec![
                (ATTRIBUTE_KEY_VAULT_DENOM, denom.clone()),
                (ATTRIBUTE_KEY_OWNER, owner.to_string()),
                (ATTRIBUTE_KEY_SHARES, shares.to_string()),
                (ATTRIBUTE_KEY_AMOUNT, amount.to_string()),
            ],
            VaultEvent::Liquidate {
                denom,
                amount,
                holders,
            } => vec![
                (ATTRIBUTE_KEY_VAULT_DENOM, denom.clone()),
                (ATTRIBUTE_KEY_AMOUNT, amount.to_string()),
                (ATTRIBUTE_KEY_HOLDERS, holders.to_string()),
            ],
        }
    }
}
