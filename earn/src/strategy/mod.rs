//! # Strategy Module: Pluggable Vault Backends
//!
//! A strategy custodies a vault's assets and puts them to work. The keeper
//! talks to every strategy through the [`Strategy`] trait and never learns
//! which concrete variant it holds; which variant backs a vault is data
//! ([`StrategyType`] on the vault's `AllowedVault` entry), resolved through
//! the [`StrategyRegistry`].
//!
//! ## Architecture
//!
//! ```text
//! custody.rs      : strategy-owned module account shared by the variants
//! registry.rs     : StrategyType -> Strategy, fixed at construction
//! stablecoin.rs   : mint USDX from a stablecoin, supply it to lend
//! money_market.rs : supply directly to a money market, with supply caps
//! ```
//!
//! ## Contract
//!
//! - [`Strategy::estimated_total_assets`] is the conversion denominator. It
//!   may change between calls as yield accrues or losses land.
//! - [`Strategy::deposit`] takes assets from the vault module account.
//! - [`Strategy::withdraw`] returns assets to the vault module account and
//!   must fail if the strategy holds less than requested.
//! - [`Strategy::liquidate_all`] returns everything held for a denom.

pub mod custody;
pub mod money_market;
pub mod registry;
pub mod stablecoin;

pub use custody::CustodyAccount;
pub use money_market::MoneyMarketStrategy;
pub use registry::StrategyRegistry;
pub use stablecoin::StablecoinStrategy;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::storage::TxContext;
use crate::types::Coin;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors a strategy can report. The keeper wraps these with the operation
/// that failed and never swallows them.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The strategy does not manage this denom.
    #[error("strategy {strategy} does not support denom {denom}")]
    UnsupportedDenom { strategy: StrategyType, denom: String },

    /// A withdrawal asked for more than the strategy holds.
    #[error("insufficient managed value: holds {managed}{denom}, requested {requested}{denom}")]
    InsufficientManagedValue {
        denom: String,
        managed: u128,
        requested: u128,
    },

    /// A deposit would push the strategy past its supply cap.
    #[error("supply cap exceeded for {denom}: cap {cap}, would hold {requested}")]
    SupplyCapExceeded {
        denom: String,
        cap: u128,
        requested: u128,
    },

    #[error("custody error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type StrategyResult<T> = Result<T, StrategyError>;

// ---------------------------------------------------------------------------
// StrategyType
// ---------------------------------------------------------------------------

/// Identifies a strategy variant. Vault configuration refers to strategies
/// by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Mint USDX from a stablecoin, then supply the USDX to lend.
    Stablecoin,
    /// Supply the asset directly to a money market.
    MoneyMarket,
}

impl StrategyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Stablecoin => "stablecoin",
            StrategyType::MoneyMarket => "money_market",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// The capability every vault backend provides.
pub trait Strategy: Send + Sync {
    /// Registry tag for this strategy.
    fn strategy_type(&self) -> StrategyType;

    fn name(&self) -> &str {
        self.strategy_type().as_str()
    }

    fn description(&self) -> &str;

    fn supported_denoms(&self) -> &[String];

    fn supports(&self, denom: &str) -> bool {
        self.supported_denoms().iter().any(|d| d == denom)
    }

    /// `UnsupportedDenom` unless this strategy manages `denom`.
    fn ensure_supported(&self, denom: &str) -> StrategyResult<()> {
        if !self.supports(denom) {
            return Err(StrategyError::UnsupportedDenom {
                strategy: self.strategy_type(),
                denom: denom.to_string(),
            });
        }
        Ok(())
    }

    /// Current value the strategy manages for `denom`.
    fn estimated_total_assets(&self, ctx: &TxContext<'_>, denom: &str) -> StrategyResult<Coin>;

    /// Move `amount` from the vault module account into strategy custody.
    fn deposit(&self, ctx: &mut TxContext<'_>, amount: &Coin) -> StrategyResult<()>;

    /// Move `amount` from strategy custody back to the vault module account.
    fn withdraw(&self, ctx: &mut TxContext<'_>, amount: &Coin) -> StrategyResult<()>;

    /// Return everything held for `denom` to the vault module account.
    fn liquidate_all(&self, ctx: &mut TxContext<'_>, denom: &str) -> StrategyResult<Coin>;
}
