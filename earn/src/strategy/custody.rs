//! Strategy custody accounts.
//!
//! Each strategy holds its assets in its own module account, derived from
//! `earn/strategy/<name>`. Whatever that account holds *is* the strategy's
//! managed value: an external credit to it is yield, an external debit is a
//! loss.

use std::sync::Arc;

use super::{StrategyError, StrategyResult, StrategyType};
use crate::config::{strategy_account_name, MODULE_NAME};
use crate::ledger::CustodyLedger;
use crate::storage::TxContext;
use crate::types::{AccAddress, Coin};

/// A strategy's custody account plus the vault module account it trades
/// with.
#[derive(Clone)]
pub struct CustodyAccount {
    address: AccAddress,
    vault_module: AccAddress,
    ledger: Arc<dyn CustodyLedger>,
}

impl CustodyAccount {
    pub fn new(strategy: StrategyType, ledger: Arc<dyn CustodyLedger>) -> Self {
        Self {
            address: AccAddress::module(&strategy_account_name(strategy.as_str())),
            vault_module: AccAddress::module(MODULE_NAME),
            ledger,
        }
    }

    pub fn address(&self) -> &AccAddress {
        &self.address
    }

    pub fn balance(&self, ctx: &TxContext<'_>, denom: &str) -> StrategyResult<u128> {
        Ok(self.ledger.balance(ctx, &self.address, denom)?)
    }

    /// Pull `coin` from the vault module account into custody.
    pub fn pull(&self, ctx: &mut TxContext<'_>, coin: &Coin) -> StrategyResult<()> {
        self.ledger.send(ctx, &self.vault_module, &self.address, coin)?;
        Ok(())
    }

    /// Return `coin` to the vault module account. Fails without touching
    /// the ledger if custody holds less than requested.
    pub fn release(&self, ctx: &mut TxContext<'_>, coin: &Coin) -> StrategyResult<()> {
        let managed = self.balance(ctx, &coin.denom)?;
        if managed < coin.amount {
            return Err(StrategyError::InsufficientManagedValue {
                denom: coin.denom.clone(),
                managed,
                requested: coin.amount,
            });
        }
        self.ledger.send(ctx, &self.address, &self.vault_module, coin)?;
        Ok(())
    }

    /// Return the whole custody balance of `denom`.
    pub fn release_all(&self, ctx: &mut TxContext<'_>, denom: &str) -> StrategyResult<Coin> {
        let held = Coin::new(denom, self.balance(ctx, denom)?);
        if !held.is_zero() {
            self.ledger.send(ctx, &self.address, &self.vault_module, &held)?;
        }
        Ok(held)
    }
}

impl std::fmt::Debug for CustodyAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustodyAccount")
            .field("address", &self.address)
            .field("vault_module", &self.vault_module)
            .finish_non_exhaustive()
    }
}
