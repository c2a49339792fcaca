//! Orchestrator errors.
//!
//! Every keeper operation returns [`EarnResult`]. Validation failures are
//! raised before any state is touched; strategy and ledger failures abort
//! the operation and the surrounding scope discards its writes.

use thiserror::Error;

use super::conversion::ConversionError;
use super::params::ParamsError;
use crate::ledger::LedgerError;
use crate::storage::DbError;
use crate::strategy::{StrategyError, StrategyType};
use crate::types::AccAddress;

#[derive(Debug, Error)]
pub enum EarnError {
    /// No allowed vault is configured for the denom.
    #[error("invalid vault denom: {0}")]
    InvalidVaultDenom(String),

    /// The requested amount is zero, or converts to zero shares.
    #[error("insufficient amount")]
    InsufficientAmount,

    #[error("vault record not found for {0}")]
    VaultRecordNotFound(String),

    #[error("vault share record not found for {owner} in {denom}")]
    VaultShareRecordNotFound { owner: AccAddress, denom: String },

    /// The withdrawal asks for more than the account owns.
    #[error("insufficient value: account holds {available}{denom}, requested {requested}{denom}")]
    InsufficientValue {
        denom: String,
        available: u128,
        requested: u128,
    },

    #[error("invalid shares: {0}")]
    InvalidShares(String),

    #[error("vault {denom} is configured with unusable strategy {strategy}")]
    InvalidVaultStrategy { strategy: StrategyType, denom: String },

    #[error("account {owner} is not allowed to deposit into private vault {denom}")]
    AccountNotAllowed { owner: AccAddress, denom: String },

    #[error("deposit of {got} is below the vault minimum of {min}")]
    BelowMinimumDeposit { min: u128, got: u128 },

    /// A strategy call failed; `operation` names the call.
    #[error("strategy {operation} failed: {source}")]
    Strategy {
        operation: &'static str,
        #[source]
        source: StrategyError,
    },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Stored state contradicts itself. Never recovered from.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    #[error("invalid params: {0}")]
    Params(#[from] ParamsError),
}

impl EarnError {
    /// Wrap a strategy failure with the call that produced it.
    pub fn strategy(operation: &'static str) -> impl FnOnce(StrategyError) -> Self {
        move |source| EarnError::Strategy { operation, source }
    }

    /// `true` for errors that mean the stored state is corrupt.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            EarnError::InvariantViolation(_) => true,
            EarnError::Conversion(err) => err.is_invariant_violation(),
            _ => false,
        }
    }
}

pub type EarnResult<T> = Result<T, EarnError>;
