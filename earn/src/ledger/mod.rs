//! # Custody Ledger
//!
//! Token custody is an external service as far as the vault accounting is
//! concerned: the keeper only needs to move coins between user accounts and
//! module accounts, atomically with its own record updates. The
//! [`CustodyLedger`] trait is that contract. [`BankLedger`] implements it
//! on the same [`TxContext`], so coin movements commit or roll back with
//! everything else in the transaction.

pub mod bank;

pub use bank::BankLedger;

use thiserror::Error;

use crate::storage::{DbError, TxContext};
use crate::types::{AccAddress, Coin, CoinError};

/// Errors returned by custody operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The sender holds less than the amount being moved.
    #[error("insufficient funds: {address} has {available}{denom}, needs {requested}{denom}")]
    InsufficientFunds {
        address: AccAddress,
        denom: String,
        available: u128,
        requested: u128,
    },

    /// Crediting the recipient would overflow its balance.
    #[error("balance overflow crediting {amount}{denom} to {address}")]
    Overflow {
        address: AccAddress,
        denom: String,
        amount: u128,
    },

    #[error("invalid coin: {0}")]
    InvalidCoin(#[from] CoinError),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Moves coins between accounts inside a transaction.
pub trait CustodyLedger: Send + Sync {
    /// Current balance of `denom` held by `address`.
    fn balance(&self, ctx: &TxContext<'_>, address: &AccAddress, denom: &str) -> LedgerResult<u128>;

    /// Move `coin` from one account to another.
    fn send(
        &self,
        ctx: &mut TxContext<'_>,
        from: &AccAddress,
        to: &AccAddress,
        coin: &Coin,
    ) -> LedgerResult<()>;

    /// Create new supply in `to`. Used for genesis balances and for
    /// external credits such as strategy yield.
    fn mint(&self, ctx: &mut TxContext<'_>, to: &AccAddress, coin: &Coin) -> LedgerResult<()>;

    /// Destroy supply held by `from`. Used for external debits such as
    /// strategy losses.
    fn burn(&self, ctx: &mut TxContext<'_>, from: &AccAddress, coin: &Coin) -> LedgerResult<()>;
}
