//! Strategy registry.
//!
//! Maps [`StrategyType`] to the strategy instance that serves it. The
//! registry is assembled once, before the keeper is built, and the keeper
//! only ever borrows from it; there is no way to add or swap a strategy
//! afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{MoneyMarketStrategy, StablecoinStrategy, Strategy, StrategyType};
use crate::ledger::CustodyLedger;

#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<StrategyType, Box<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in strategy on its default denom set.
    pub fn standard(ledger: Arc<dyn CustodyLedger>) -> Self {
        Self::new()
            .with(StablecoinStrategy::new(ledger.clone()))
            .with(MoneyMarketStrategy::new(ledger))
    }

    /// Add a strategy, replacing any earlier one with the same type.
    pub fn with(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies
            .insert(strategy.strategy_type(), Box::new(strategy));
        self
    }

    pub fn get(&self, strategy_type: StrategyType) -> Option<&dyn Strategy> {
        self.strategies.get(&strategy_type).map(|s| s.as_ref())
    }

    pub fn contains(&self, strategy_type: StrategyType) -> bool {
        self.strategies.contains_key(&strategy_type)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = StrategyType> + '_ {
        self.strategies.keys().copied()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.strategies.keys()).finish()
    }
}
