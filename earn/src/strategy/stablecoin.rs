//! Stablecoin strategy.
//!
//! Mints USDX against a deposited stablecoin and supplies the USDX to
//! lend. The minting and lending legs are owned by other modules; from the
//! vault's point of view the strategy is a custody account per stablecoin
//! whose balance is the redeemable value.

use std::sync::Arc;
use tracing::debug;

use super::{CustodyAccount, Strategy, StrategyResult, StrategyType};
use crate::config::DEFAULT_STABLECOIN_DENOMS;
use crate::ledger::CustodyLedger;
use crate::storage::TxContext;
use crate::types::Coin;

#[derive(Debug, Clone)]
pub struct StablecoinStrategy {
    custody: CustodyAccount,
    denoms: Vec<String>,
}

impl StablecoinStrategy {
    /// Strategy accepting the default stablecoin set.
    pub fn new(ledger: Arc<dyn CustodyLedger>) -> Self {
        Self::with_denoms(
            ledger,
            DEFAULT_STABLECOIN_DENOMS.iter().map(|d| d.to_string()).collect(),
        )
    }

    pub fn with_denoms(ledger: Arc<dyn CustodyLedger>, denoms: Vec<String>) -> Self {
        Self {
            custody: CustodyAccount::new(StrategyType::Stablecoin, ledger),
            denoms,
        }
    }

    pub fn custody(&self) -> &CustodyAccount {
        &self.custody
    }
}

impl Strategy for StablecoinStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Stablecoin
    }

    fn description(&self) -> &str {
        "Mint USDX from stablecoin, then supply the USDX to Lend"
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
        self.custody.pull(ctx, amount)?;
        debug!(strategy = self.name(), %amount, "stablecoin supplied");
        Ok(())
    }

    fn withdraw(&self, ctx: &mut TxContext<'_>, amount: &Coin) -> StrategyResult<()> {
        self.ensure_supported(&amount.denom)?;
        self.custody.release(ctx, amount)?;
        debug!(strategy = self.name(), %amount, "stablecoin redeemed");
        Ok(())
    }

    fn liquidate_all(&self, ctx: &mut TxContext<'_>, denom: &str) -> StrategyResult<Coin> {
        self.ensure_supported(denom)?;
        self.custody.release_all(ctx, denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MODULE_NAME;
    use crate::ledger::BankLedger;
    use crate::storage::EarnDB;
    use crate::strategy::StrategyError;
    use crate::types::AccAddress;

    fn setup() -> (EarnDB, Arc<BankLedger>, StablecoinStrategy) {
        let db = EarnDB::open_temporary().unwrap();
        let ledger = Arc::new(BankLedger::new());
        let strategy = StablecoinStrategy::new(ledger.clone());
        (db, ledger, strategy)
    }

    fn module() -> AccAddress {
        AccAddress::module(MODULE_NAME)
    }

    #[test]
    fn metadata() {
        let (_db, _ledger, strategy) = setup();
        assert_eq!(strategy.name(), "stablecoin");
        assert!(strategy.supports("usdc"));
        assert!(!strategy.supports("ukava"));
        assert_eq!(strategy.supported_denoms().len(), 4);
    }

    #[test]
    fn deposit_moves_module_funds_into_custody() {
        let (db, ledger, strategy) = setup();
        let mut ctx = db.begin(1);
        ledger.mint(&mut ctx, &module(), &Coin::new("usdc", 500)).unwrap();

        strategy.deposit(&mut ctx, &Coin::new("usdc", 300)).unwrap();

        assert_eq!(
            strategy.estimated_total_assets(&ctx, "usdc").unwrap(),
            Coin::new("usdc", 300)
        );
        assert_eq!(ledger.balance(&ctx, &module(), "usdc").unwrap(), 200);
    }

    #[test]
    fn rejects_unsupported_denom() {
        let (db, ledger, strategy) = setup();
        let mut ctx = db.begin(1);
        ledger.mint(&mut ctx, &module(), &Coin::new("ukava", 10)).unwrap();

        assert!(matches!(
            strategy.deposit(&mut ctx, &Coin::new("ukava", 10)),
            Err(StrategyError::UnsupportedDenom { .. })
        ));
    }

    #[test]
    fn withdraw_more_than_managed_fails() {
        let (db, ledger, strategy) = setup();
        let mut ctx = db.begin(1);
        ledger.mint(&mut ctx, &module(), &Coin::new("usdc", 100)).unwrap();
        strategy.deposit(&mut ctx, &Coin::new("usdc", 100)).unwrap();

        let err = strategy
            .withdraw(&mut ctx, &Coin::new("usdc", 101))
            .unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InsufficientManagedValue {
                managed: 100,
                requested: 101,
                ..
            }
        ));
    }

    #[test]
    fn accrued_yield_is_reported_and_liquidated() {
        let (db, ledger, strategy) = setup();
        let mut ctx = db.begin(1);
        ledger.mint(&mut ctx, &module(), &Coin::new("usdc", 1000)).unwrap();
        strategy.deposit(&mut ctx, &Coin::new("usdc", 1000)).unwrap();
        ledger
            .mint(&mut ctx, strategy.custody().address(), &Coin::new("usdc", 100))
            .unwrap();

        assert_eq!(strategy.estimated_total_assets(&ctx, "usdc").unwrap().amount, 1100);

        let liquidated = strategy.liquidate_all(&mut ctx, "usdc").unwrap();
        assert_eq!(liquidated, Coin::new("usdc", 1100));
        assert_eq!(ledger.balance(&ctx, &module(), "usdc").unwrap(), 1100);
        assert_eq!(strategy.estimated_total_assets(&ctx, "usdc").unwrap().amount, 0);
    }
}
