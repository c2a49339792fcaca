//! Money market strategy.
//!
//! Supplies the vault asset directly to a money market. Markets can carry a
//! supply cap per denom; a deposit that would push custody past the cap is
//! refused so the vault never holds more than the market will accept.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{CustodyAccount, Strategy, StrategyError, StrategyResult, StrategyType};
use crate::config::DEFAULT_MONEY_MARKET_DENOMS;
use crate::ledger::CustodyLedger;
use crate::storage::TxContext;
use crate::types::Coin;

#[derive(Debug, Clone)]
pub struct MoneyMarketStrategy {
    custody: CustodyAccount,
    denoms: Vec<String>,
    supply_caps: HashMap<String, u128>,
}

impl MoneyMarketStrategy {
    /// Strategy supplying the default market set, uncapped.
    pub fn new(ledger: Arc<dyn CustodyLedger>) -> Self {
        Self::with_denoms(
            ledger,
            DEFAULT_MONEY_MARKET_DENOMS.iter().map(|d| d.to_string()).collect(),
        )
    }

    pub fn with_denoms(ledger: Arc<dyn CustodyLedger>, denoms: Vec<String>) -> Self {
        Self {
            custody: CustodyAccount::new(StrategyType::MoneyMarket, ledger),
            denoms,
            supply_caps: HashMap::new(),
        }
    }

    /// Cap the total amount of `denom` this strategy will hold.
    pub fn with_supply_cap(mut self, denom: impl Into<String>, cap: u128) -> Self {
        self.supply_caps.insert(denom.into(), cap);
        self
    }

    pub fn supply_cap(&self, denom: &str) -> Option<u128> {
        self.supply_caps.get(denom).copied()
    }

    pub fn custody(&self) -> &CustodyAccount {
        &self.custody
    }
}

impl Strategy for MoneyMarketStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::MoneyMarket
    }

    fn description(&self) -> &str {
        "Supply the vault asset to a money market"
    }

    fn supported_denoms(&self) -> &[String] {
        &self.denoms
    }

    fn estimated_total_assets(&self, ctx: &TxContext<'_>, denom: &str) -> StrategyResult<Coin> {
        self.ensure_supported(denom)?;
        Ok(Coin::new(denom, self.custody.balance(ctx, denom)?))
    }

    fn deposit(&self, ctx: &mut TxContext<'_>, amount: &Coin) -> StrategyResult<()> {
        self.ensure_supported(&amount.denom)?;

        if let Some(cap) = self.supply_cap(&amount.denom) {
            let held = self.custody.balance(ctx, &amount.denom)?;
            let requested = held.saturating_add(amount.amount);
            if requested > cap {
                return Err(StrategyError::SupplyCapExceeded {
                    denom: amount.denom.clone(),
                    cap,
                    requested,
                });
            }
        }

        self.custody.pull(ctx, amount)?;
        debug!(strategy = self.name(), %amount, "supplied to money market");
        Ok(())
    }

    fn withdraw(&self, ctx: &mut TxContext<'_>, amount: &Coin) -> StrategyResult<()> {
        self.ensure_supported(&amount.denom)?;
        self.custody.release(ctx, amount)?;
        debug!(strategy = self.name(), %amount, "withdrawn from money market");
        Ok(())
    }

    fn liquidate_all(&self, ctx: &mut TxContext<'_>, denom: &str) -> StrategyResult<Coin> {
        self.ensure_supported(denom)?;
        self.custody.release_all(ctx, denom)
    }
}
