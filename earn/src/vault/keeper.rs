//! # Vault Keeper
//!
//! The deposit/withdraw orchestrator. Each public operation is one atomic
//! transition `validate -> convert -> strategy -> records -> emit`, run
//! inside [`TxContext::scoped`] so a failure at any step leaves no trace in
//! the context.
//!
//! The conversion rate of a vault is read once per operation into a
//! [`ShareRate`] and reused for every conversion and the dust check, so a
//! strategy moving funds mid-operation cannot skew the arithmetic.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::conversion::ShareRate;
use super::dust::{self, DustOutcome};
use super::error::{EarnError, EarnResult};
use super::events::VaultEvent;
use super::params::{AllowedVault, EarnParams};
use super::record::{VaultRecord, VaultShareRecord};
use crate::config::MODULE_NAME;
use crate::ledger::CustodyLedger;
use crate::storage::TxContext;
use crate::strategy::{Strategy, StrategyRegistry, StrategyType};
use crate::types::{AccAddress, Coin};

/// Result of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    /// Shares removed from the account, including any swept dust.
    pub shares: u128,
    /// Assets paid to the account.
    pub paid: Coin,
    pub dust: DustOutcome,
}

/// Result of decommissioning a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationReport {
    /// Everything the strategy returned.
    pub recovered: Coin,
    /// Sum paid out to holders.
    pub paid: u128,
    pub holders: usize,
    /// Rounding remainder left in the vault module account.
    pub residue: u128,
}

/// One row of [`VaultKeeper::vaults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSummary {
    pub denom: String,
    pub strategy: StrategyType,
    pub is_private_vault: bool,
    pub total_shares: u128,
    pub total_value: Coin,
}

pub struct VaultKeeper {
    params: EarnParams,
    registry: StrategyRegistry,
    ledger: Arc<dyn CustodyLedger>,
    module_account: AccAddress,
}

impl VaultKeeper {
    /// Build a keeper, rejecting params that name an unregistered strategy
    /// or a strategy that does not support the vault's denom.
    pub fn new(
        params: EarnParams,
        registry: StrategyRegistry,
        ledger: Arc<dyn CustodyLedger>,
    ) -> EarnResult<Self> {
        params.validate()?;

        for vault in &params.allowed_vaults {
            let usable = registry
                .get(vault.strategy)
                .is_some_and(|s| s.supports(&vault.denom));
            if !usable {
                return Err(EarnError::InvalidVaultStrategy {
                    strategy: vault.strategy,
                    denom: vault.denom.clone(),
                });
            }
        }

        info!(
            vaults = params.allowed_vaults.len(),
            strategies = registry.len(),
            "vault keeper ready"
        );

        Ok(Self {
            params,
            registry,
            ledger,
            module_account: AccAddress::module(MODULE_NAME),
        })
    }

    pub fn params(&self) -> &EarnParams {
        &self.params
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// The account every vault's assets pass through.
    pub fn module_account(&self) -> &AccAddress {
        &self.module_account
    }

    // -- Deposit ------------------------------------------------------------

    /// Deposit `amount` from `depositor` and return the shares minted.
    pub fn deposit(
        &self,
        ctx: &mut TxContext<'_>,
        depositor: &AccAddress,
        amount: &Coin,
    ) -> EarnResult<u128> {
        ctx.scoped(|ctx| self.deposit_inner(ctx, depositor, amount))
    }

    fn deposit_inner(
        &self,
        ctx: &mut TxContext<'_>,
        depositor: &AccAddress,
        amount: &Coin,
    ) -> EarnResult<u128> {
        let vault = self.allowed_vault(&amount.denom)?;
        if amount.is_zero() {
            return Err(EarnError::InsufficientAmount);
        }
        if !vault.is_account_allowed(depositor) {
            return Err(EarnError::AccountNotAllowed {
                owner: *depositor,
                denom: vault.denom.clone(),
            });
        }
        if amount.amount < vault.min_deposit {
            return Err(EarnError::BelowMinimumDeposit {
                min: vault.min_deposit,
                got: amount.amount,
            });
        }

        let strategy = self.strategy_for(vault)?;
        let rate = self.share_rate(ctx, strategy, &vault.denom)?;
        let shares = rate.to_shares(amount.amount)?;
        if shares == 0 {
            return Err(EarnError::InvalidShares(format!(
                "deposit of {amount} mints zero shares"
            )));
        }
        debug!(denom = %vault.denom, assets = amount.amount, shares, ?rate, "deposit converted");

        self.ledger
            .send(ctx, depositor, &self.module_account, amount)?;
        strategy
            .deposit(ctx, amount)
            .map_err(EarnError::strategy("deposit"))?;

        let mut vault_record = ctx
            .get_vault_record(&vault.denom)?
            .unwrap_or_else(|| VaultRecord::new(&vault.denom));
        vault_record.total_shares = vault_record
            .total_shares
            .checked_add(shares)
            .ok_or(EarnError::Overflow)?;

        let mut share_record = ctx
            .get_vault_share_record(depositor, &vault.denom)?
            .unwrap_or_else(|| VaultShareRecord::new(*depositor, &vault.denom));
        share_record.shares = share_record
            .shares
            .checked_add(shares)
            .ok_or(EarnError::Overflow)?;

        ctx.set_vault_record(&vault_record)?;
        ctx.set_vault_share_record(&share_record)?;

        ctx.emit(VaultEvent::Deposit {
            denom: vault.denom.clone(),
            owner: *depositor,
            shares,
            amount: amount.amount,
        });
        info!(denom = %vault.denom, owner = %depositor, shares, amount = amount.amount, "vault deposit");
        Ok(shares)
    }

    // -- Withdraw -----------------------------------------------------------

    /// Withdraw up to `amount` for `owner`.
    ///
    /// The payout is the floored value of the shares burned, so it can be
    /// slightly less than requested. If the shares left behind would be
    /// worth less than one unit they are burned too and the payout becomes
    /// the value of the whole balance.
    pub fn withdraw(
        &self,
        ctx: &mut TxContext<'_>,
        owner: &AccAddress,
        amount: &Coin,
    ) -> EarnResult<Withdrawal> {
        ctx.scoped(|ctx| self.withdraw_inner(ctx, owner, amount))
    }

    fn withdraw_inner(
        &self,
        ctx: &mut TxContext<'_>,
        owner: &AccAddress,
        amount: &Coin,
    ) -> EarnResult<Withdrawal> {
        let vault = self.allowed_vault(&amount.denom)?;
        if amount.is_zero() {
            return Err(EarnError::InsufficientAmount);
        }
        let mut vault_record = ctx
            .get_vault_record(&vault.denom)?
            .ok_or_else(|| EarnError::VaultRecordNotFound(vault.denom.clone()))?;
        let mut share_record = ctx
            .get_vault_share_record(owner, &vault.denom)?
            .ok_or_else(|| EarnError::VaultShareRecordNotFound {
                owner: *owner,
                denom: vault.denom.clone(),
            })?;

        let strategy = self.strategy_for(vault)?;
        let rate = self.share_rate(ctx, strategy, &vault.denom)?;
        let account_value = rate.to_assets(share_record.shares)?;

        let requested_shares = rate.to_shares(amount.amount)?;
        if requested_shares == 0 {
            return Err(EarnError::InsufficientAmount);
        }
        if requested_shares > share_record.shares {
            return Err(EarnError::InsufficientValue {
                denom: vault.denom.clone(),
                available: account_value,
                requested: amount.amount,
            });
        }

        let (shares, dust) = dust::apply(&rate, share_record.shares, requested_shares)?;
        let payout = rate.to_assets(shares)?;
        if payout == 0 {
            return Err(EarnError::InsufficientAmount);
        }
        if payout > account_value {
            return Err(EarnError::InsufficientValue {
                denom: vault.denom.clone(),
                available: account_value,
                requested: payout,
            });
        }
        debug!(denom = %vault.denom, requested = amount.amount, shares, payout, ?rate, "withdraw converted");

        let paid = Coin::new(&vault.denom, payout);
        strategy
            .withdraw(ctx, &paid)
            .map_err(EarnError::strategy("withdraw"))?;
        self.ledger.send(ctx, &self.module_account, owner, &paid)?;

        if let DustOutcome::Swept { residue } = dust {
            warn!(denom = %vault.denom, owner = %owner, residue, "dust shares swept");
        }

        vault_record.total_shares = vault_record
            .total_shares
            .checked_sub(shares)
            .ok_or_else(|| {
                EarnError::InvariantViolation(format!(
                    "vault {} holds {} shares, account burns {}",
                    vault.denom, vault_record.total_shares, shares
                ))
            })?;
        share_record.shares -= shares;

        ctx.update_vault_record(&vault_record)?;
        ctx.update_vault_share_record(&share_record)?;

        ctx.emit(VaultEvent::Withdraw {
            denom: vault.denom.clone(),
            owner: *owner,
            shares,
            amount: payout,
        });
        info!(denom = %vault.denom, owner = %owner, shares, amount = payout, "vault withdraw");

        Ok(Withdrawal { shares, paid, dust })
    }

    /// Burn every share `owner` holds in `denom` and pay their floored
    /// value. A balance worth nothing is still removed; the strategy and
    /// ledger are then left alone.
    pub fn withdraw_all(
        &self,
        ctx: &mut TxContext<'_>,
        owner: &AccAddress,
        denom: &str,
    ) -> EarnResult<Withdrawal> {
        ctx.scoped(|ctx| self.withdraw_all_inner(ctx, owner, denom))
    }

    fn withdraw_all_inner(
        &self,
        ctx: &mut TxContext<'_>,
        owner: &AccAddress,
        denom: &str,
    ) -> EarnResult<Withdrawal> {
        let vault = self.allowed_vault(denom)?;
        let mut vault_record = ctx
            .get_vault_record(denom)?
            .ok_or_else(|| EarnError::VaultRecordNotFound(denom.to_string()))?;
        let share_record = ctx
            .get_vault_share_record(owner, denom)?
            .ok_or_else(|| EarnError::VaultShareRecordNotFound {
                owner: *owner,
                denom: denom.to_string(),
            })?;

        let strategy = self.strategy_for(vault)?;
        let rate = self.share_rate(ctx, strategy, denom)?;
        let shares = share_record.shares;
        let paid = Coin::new(denom, rate.to_assets(shares)?);

        if !paid.is_zero() {
            strategy
                .withdraw(ctx, &paid)
                .map_err(EarnError::strategy("withdraw"))?;
            self.ledger.send(ctx, &self.module_account, owner, &paid)?;
        }

        vault_record.total_shares = vault_record
            .total_shares
            .checked_sub(shares)
            .ok_or_else(|| {
                EarnError::InvariantViolation(format!(
                    "vault {denom} holds {} shares, account burns {shares}",
                    vault_record.total_shares
                ))
            })?;
        ctx.update_vault_record(&vault_record)?;
        ctx.delete_vault_share_record(owner, denom);

        ctx.emit(VaultEvent::Withdraw {
            denom: denom.to_string(),
            owner: *owner,
            shares,
            amount: paid.amount,
        });
        info!(%denom, owner = %owner, shares, amount = paid.amount, "vault withdraw all");

        Ok(Withdrawal {
            shares,
            paid,
            dust: DustOutcome::Kept { remaining: 0 },
        })
    }

    // -- Liquidation --------------------------------------------------------

    /// Pull everything out of the vault's strategy and pay every holder
    /// pro rata. All share records and the vault record are removed.
    pub fn liquidate_vault(
        &self,
        ctx: &mut TxContext<'_>,
        denom: &str,
    ) -> EarnResult<LiquidationReport> {
        ctx.scoped(|ctx| self.liquidate_vault_inner(ctx, denom))
    }

    fn liquidate_vault_inner(
        &self,
        ctx: &mut TxContext<'_>,
        denom: &str,
    ) -> EarnResult<LiquidationReport> {
        let vault = self.allowed_vault(denom)?;
        let vault_record = ctx
            .get_vault_record(denom)?
            .ok_or_else(|| EarnError::VaultRecordNotFound(denom.to_string()))?;
        let holders = ctx.vault_share_records(denom)?;

        let strategy = self.strategy_for(vault)?;
        let recovered = strategy
            .liquidate_all(ctx, denom)
            .map_err(EarnError::strategy("liquidate_all"))?;
        let rate = ShareRate::new(recovered.amount, vault_record.total_shares);

        let mut paid = 0u128;
        for holder in &holders {
            let payout = rate.to_assets(holder.shares)?;
            if payout > 0 {
                self.ledger.send(
                    ctx,
                    &self.module_account,
                    &holder.owner,
                    &Coin::new(denom, payout),
                )?;
            }
            paid = paid.checked_add(payout).ok_or(EarnError::Overflow)?;
            ctx.delete_vault_share_record(&holder.owner, denom);
            ctx.emit(VaultEvent::Withdraw {
                denom: denom.to_string(),
                owner: holder.owner,
                shares: holder.shares,
                amount: payout,
            });
        }
        ctx.delete_vault_record(denom);

        let residue = recovered.amount.checked_sub(paid).ok_or_else(|| {
            EarnError::InvariantViolation(format!(
                "liquidation of {denom} paid {paid} from {} recovered",
                recovered.amount
            ))
        })?;

        ctx.emit(VaultEvent::Liquidate {
            denom: denom.to_string(),
            amount: paid,
            holders: holders.len(),
        });
        warn!(%denom, recovered = recovered.amount, paid, holders = holders.len(), residue, "vault liquidated");

        Ok(LiquidationReport {
            recovered,
            paid,
            holders: holders.len(),
            residue,
        })
    }

    // -- Queries ------------------------------------------------------------

    /// The vault configured for `denom`.
    pub fn allowed_vault(&self, denom: &str) -> EarnResult<&AllowedVault> {
        self.params
            .allowed_vault(denom)
            .ok_or_else(|| EarnError::InvalidVaultDenom(denom.to_string()))
    }

    /// Value currently managed by the vault's strategy.
    pub fn vault_total_value(&self, ctx: &TxContext<'_>, denom: &str) -> EarnResult<Coin> {
        let vault = self.allowed_vault(denom)?;
        self.strategy_for(vault)?
            .estimated_total_assets(ctx, denom)
            .map_err(EarnError::strategy("estimated_total_assets"))
    }

    /// Outstanding shares of the vault, zero if nobody holds any.
    pub fn vault_total_shares(&self, ctx: &TxContext<'_>, denom: &str) -> EarnResult<u128> {
        self.allowed_vault(denom)?;
        Ok(ctx
            .get_vault_record(denom)?
            .map(|r| r.total_shares)
            .unwrap_or(0))
    }

    pub fn vault_account_shares(
        &self,
        ctx: &TxContext<'_>,
        owner: &AccAddress,
        denom: &str,
    ) -> EarnResult<u128> {
        self.allowed_vault(denom)?;
        Ok(ctx
            .get_vault_share_record(owner, denom)?
            .map(|r| r.shares)
            .unwrap_or(0))
    }

    /// Floored asset value of `owner`'s shares at the current rate.
    pub fn vault_account_value(
        &self,
        ctx: &TxContext<'_>,
        owner: &AccAddress,
        denom: &str,
    ) -> EarnResult<Coin> {
        let vault = self.allowed_vault(denom)?;
        let record = ctx.get_vault_share_record(owner, denom)?.ok_or_else(|| {
            EarnError::VaultShareRecordNotFound {
                owner: *owner,
                denom: denom.to_string(),
            }
        })?;
        let rate = self.share_rate(ctx, self.strategy_for(vault)?, denom)?;
        Ok(Coin::new(denom, rate.to_assets(record.shares)?))
    }

    /// Every allowed vault, in params order.
    pub fn vaults(&self, ctx: &TxContext<'_>) -> EarnResult<Vec<VaultSummary>> {
        self.params
            .allowed_vaults
            .iter()
            .map(|vault| {
                Ok(VaultSummary {
                    denom: vault.denom.clone(),
                    strategy: vault.strategy,
                    is_private_vault: vault.is_private_vault,
                    total_shares: self.vault_total_shares(ctx, &vault.denom)?,
                    total_value: self.vault_total_value(ctx, &vault.denom)?,
                })
            })
            .collect()
    }

    // -- Internals ----------------------------------------------------------

    pub(crate) fn strategy_for(&self, vault: &AllowedVault) -> EarnResult<&dyn Strategy> {
        self.registry
            .get(vault.strategy)
            .ok_or_else(|| EarnError::InvalidVaultStrategy {
                strategy: vault.strategy,
                denom: vault.denom.clone(),
            })
    }

    fn share_rate(
        &self,
        ctx: &TxContext<'_>,
        strategy: &dyn Strategy,
        denom: &str,
    ) -> EarnResult<ShareRate> {
        let total_assets = strategy
            .estimated_total_assets(ctx, denom)
            .map_err(EarnError::strategy("estimated_total_assets"))?
            .amount;
        let total_shares = ctx
            .get_vault_record(denom)?
            .map(|r| r.total_shares)
            .unwrap_or(0);
        Ok(ShareRate::new(total_assets, total_shares))
    }
}

impl std::fmt::Debug for VaultKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKeeper")
            .field("params", &self.params)
            .field("registry", &self.registry)
            .field("module_account", &self.module_account)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::strategy_account_name;
    use crate::ledger::BankLedger;
    use crate::storage::EarnDB;
    use crate::strategy::{MoneyMarketStrategy, StablecoinStrategy};
    use crate::vault::invariants;

    const FUNDING: u128 = 1_000_000;

    fn alice() -> AccAddress {
        AccAddress::module("alice")
    }

    fn bob() -> AccAddress {
        AccAddress::module("bob")
    }

    fn usdc(amount: u128) -> Coin {
        Coin::new("usdc", amount)
    }

    fn stablecoin_custody() -> AccAddress {
        AccAddress::module(&strategy_account_name("stablecoin"))
    }

    fn keeper() -> VaultKeeper {
        let ledger: Arc<dyn CustodyLedger> = Arc::new(BankLedger::new());
        let registry = StrategyRegistry::new()
            .with(StablecoinStrategy::new(ledger.clone()))
            .with(MoneyMarketStrategy::new(ledger.clone()).with_supply_cap("ukava", 500));
        let params = EarnParams::new(vec![
            AllowedVault::new("usdc", StrategyType::Stablecoin),
            AllowedVault::new("usdt", StrategyType::Stablecoin)
                .private(vec![alice()])
                .with_min_deposit(10),
            AllowedVault::new("ukava", StrategyType::MoneyMarket),
        ]);
        VaultKeeper::new(params, registry, ledger).unwrap()
    }

    fn fund(ctx: &mut TxContext<'_>, who: &AccAddress) {
        for denom in ["usdc", "usdt", "ukava"] {
            BankLedger
                .mint(ctx, who, &Coin::new(denom, FUNDING))
                .unwrap();
        }
    }

    fn balance(ctx: &TxContext<'_>, who: &AccAddress, denom: &str) -> u128 {
        BankLedger.balance(ctx, who, denom).unwrap()
    }

    fn accrue(ctx: &mut TxContext<'_>, amount: u128) {
        BankLedger
            .mint(ctx, &stablecoin_custody(), &usdc(amount))
            .unwrap();
    }

    fn lose(ctx: &mut TxContext<'_>, amount: u128) {
        BankLedger
            .burn(ctx, &stablecoin_custody(), &usdc(amount))
            .unwrap();
    }

    #[test]
    fn new_rejects_unsupported_strategy_denom() {
        let ledger: Arc<dyn CustodyLedger> = Arc::new(BankLedger::new());
        let params = EarnParams::new(vec![AllowedVault::new("ukava", StrategyType::Stablecoin)]);
        let err = VaultKeeper::new(params, StrategyRegistry::standard(ledger.clone()), ledger)
            .unwrap_err();
        assert!(matches!(err, EarnError::InvalidVaultStrategy { .. }));
    }

    #[test]
    fn new_rejects_unregistered_strategy() {
        let ledger: Arc<dyn CustodyLedger> = Arc::new(BankLedger::new());
        let params = EarnParams::new(vec![AllowedVault::new("usdc", StrategyType::Stablecoin)]);
        let err = VaultKeeper::new(params, StrategyRegistry::new(), ledger).unwrap_err();
        assert!(matches!(err, EarnError::InvalidVaultStrategy { .. }));
    }

    #[test]
    fn first_deposit_mints_one_to_one() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());

        assert_eq!(keeper.deposit(&mut ctx, &alice(), &usdc(1000)).unwrap(), 1000);
        assert_eq!(keeper.vault_total_shares(&ctx, "usdc").unwrap(), 1000);
        assert_eq!(keeper.vault_account_shares(&ctx, &alice(), "usdc").unwrap(), 1000);
        assert_eq!(keeper.vault_total_value(&ctx, "usdc").unwrap(), usdc(1000));
        assert_eq!(balance(&ctx, &alice(), "usdc"), FUNDING - 1000);
        assert_eq!(balance(&ctx, keeper.module_account(), "usdc"), 0);
        assert_eq!(balance(&ctx, &stablecoin_custody(), "usdc"), 1000);
        assert_eq!(ctx.events().len(), 1);
    }

    #[test]
    fn partial_withdraw_at_par() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        keeper.deposit(&mut ctx, &alice(), &usdc(1000)).unwrap();

        let out = keeper.withdraw(&mut ctx, &alice(), &usdc(400)).unwrap();
        assert_eq!(out.shares, 400);
        assert_eq!(out.paid, usdc(400));
        assert_eq!(out.dust, DustOutcome::Kept { remaining: 600 });
        assert_eq!(keeper.vault_total_shares(&ctx, "usdc").unwrap(), 600);
        assert_eq!(keeper.vault_account_shares(&ctx, &alice(), "usdc").unwrap(), 600);
        assert_eq!(balance(&ctx, &alice(), "usdc"), FUNDING - 600);
        invariants::check_all(&keeper, &ctx).unwrap();
    }

    #[test]
    fn withdraw_after_yield_floors_payout() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        fund(&mut ctx, &bob());
        keeper.deposit(&mut ctx, &alice(), &usdc(900)).unwrap();
        keeper.deposit(&mut ctx, &bob(), &usdc(100)).unwrap();
        accrue(&mut ctx, 100);

        assert_eq!(keeper.vault_account_value(&ctx, &bob(), "usdc").unwrap(), usdc(110));

        let out = keeper.withdraw(&mut ctx, &bob(), &usdc(100)).unwrap();
        assert_eq!(out.shares, 90);
        assert_eq!(out.paid, usdc(99));
        assert_eq!(keeper.vault_account_shares(&ctx, &bob(), "usdc").unwrap(), 10);
        assert_eq!(keeper.vault_total_shares(&ctx, "usdc").unwrap(), 910);
        assert_eq!(balance(&ctx, &stablecoin_custody(), "usdc"), 1001);
        invariants::check_all(&keeper, &ctx).unwrap();
    }

    #[test]
    fn request_worth_zero_shares_is_rejected() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        fund(&mut ctx, &bob());
        keeper.deposit(&mut ctx, &alice(), &usdc(999)).unwrap();
        keeper.deposit(&mut ctx, &bob(), &usdc(1)).unwrap();
        accrue(&mut ctx, 100);

        let err = keeper.withdraw(&mut ctx, &bob(), &usdc(1)).unwrap_err();
        assert!(matches!(err, EarnError::InsufficientAmount));

        let out = keeper.withdraw_all(&mut ctx, &bob(), "usdc").unwrap();
        assert_eq!(out.shares, 1);
        assert_eq!(out.paid, usdc(1));
        assert!(ctx.get_vault_share_record(&bob(), "usdc").unwrap().is_none());
        assert_eq!(keeper.vault_total_shares(&ctx, "usdc").unwrap(), 999);
    }

    #[test]
    fn payout_rounding_to_zero_is_rejected() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        keeper.deposit(&mut ctx, &alice(), &usdc(3000)).unwrap();
        lose(&mut ctx, 1000);

        // 1 asset -> 1 share -> 0 assets at a 2000/3000 rate.
        let err = keeper.withdraw(&mut ctx, &alice(), &usdc(1)).unwrap_err();
        assert!(matches!(err, EarnError::InsufficientAmount));
        assert_eq!(keeper.vault_account_shares(&ctx, &alice(), "usdc").unwrap(), 3000);
    }

    #[test]
    fn dust_remainder_is_swept() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        fund(&mut ctx, &bob());
        keeper.deposit(&mut ctx, &alice(), &usdc(2998)).unwrap();
        keeper.deposit(&mut ctx, &bob(), &usdc(2)).unwrap();
        lose(&mut ctx, 2000);

        let out = keeper.withdraw(&mut ctx, &alice(), &usdc(999)).unwrap();
        assert_eq!(out.dust, DustOutcome::Swept { residue: 1 });
        assert_eq!(out.shares, 2998);
        assert_eq!(out.paid, usdc(999));
        assert!(ctx.get_vault_share_record(&alice(), "usdc").unwrap().is_none());
        assert_eq!(keeper.vault_total_shares(&ctx, "usdc").unwrap(), 2);
        invariants::check_all(&keeper, &ctx).unwrap();
    }

    #[test]
    fn full_withdraw_deletes_both_records() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        keeper.deposit(&mut ctx, &alice(), &usdc(500)).unwrap();

        keeper.withdraw(&mut ctx, &alice(), &usdc(500)).unwrap();
        assert!(ctx.get_vault_record("usdc").unwrap().is_none());
        assert!(ctx.get_vault_share_record(&alice(), "usdc").unwrap().is_none());
        assert_eq!(balance(&ctx, &alice(), "usdc"), FUNDING);
    }

    #[test]
    fn validation_order_on_withdraw() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());

        let err = keeper
            .withdraw(&mut ctx, &alice(), &Coin::new("nonexistent", 50))
            .unwrap_err();
        assert!(matches!(err, EarnError::InvalidVaultDenom(d) if d == "nonexistent"));

        let err = keeper.withdraw(&mut ctx, &alice(), &usdc(0)).unwrap_err();
        assert!(matches!(err, EarnError::InsufficientAmount));

        let err = keeper.withdraw(&mut ctx, &alice(), &usdc(10)).unwrap_err();
        assert!(matches!(err, EarnError::VaultRecordNotFound(_)));

        keeper.deposit(&mut ctx, &alice(), &usdc(10)).unwrap();
        let err = keeper.withdraw(&mut ctx, &bob(), &usdc(10)).unwrap_err();
        assert!(matches!(err, EarnError::VaultShareRecordNotFound { .. }));
    }

    #[test]
    fn over_withdraw_touches_nothing() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        keeper.deposit(&mut ctx, &alice(), &usdc(1000)).unwrap();
        let pending = ctx.pending_writes();

        let err = keeper.withdraw(&mut ctx, &alice(), &usdc(1001)).unwrap_err();
        assert!(matches!(
            err,
            EarnError::InsufficientValue { available: 1000, requested: 1001, .. }
        ));
        assert_eq!(ctx.pending_writes(), pending);
        assert_eq!(balance(&ctx, &stablecoin_custody(), "usdc"), 1000);
        assert_eq!(ctx.events().len(), 1);
    }

    #[test]
    fn private_vault_and_minimum() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        fund(&mut ctx, &bob());

        let err = keeper
            .deposit(&mut ctx, &bob(), &Coin::new("usdt", 100))
            .unwrap_err();
        assert!(matches!(err, EarnError::AccountNotAllowed { .. }));

        let err = keeper
            .deposit(&mut ctx, &alice(), &Coin::new("usdt", 9))
            .unwrap_err();
        assert!(matches!(err, EarnError::BelowMinimumDeposit { min: 10, got: 9 }));

        assert_eq!(keeper.deposit(&mut ctx, &alice(), &Coin::new("usdt", 10)).unwrap(), 10);
    }

    #[test]
    fn deposit_minting_zero_shares_is_rejected() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        fund(&mut ctx, &bob());
        keeper.deposit(&mut ctx, &alice(), &usdc(1000)).unwrap();
        accrue(&mut ctx, 100);

        let err = keeper.deposit(&mut ctx, &bob(), &usdc(1)).unwrap_err();
        assert!(matches!(err, EarnError::InvalidShares(_)));
        assert_eq!(balance(&ctx, &bob(), "usdc"), FUNDING);
    }

    #[test]
    fn strategy_failure_reverts_transfer() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());

        let err = keeper
            .deposit(&mut ctx, &alice(), &Coin::new("ukava", 600))
            .unwrap_err();
        assert!(matches!(err, EarnError::Strategy { operation: "deposit", .. }));
        assert_eq!(balance(&ctx, &alice(), "ukava"), FUNDING);
        assert_eq!(balance(&ctx, keeper.module_account(), "ukava"), 0);
        assert!(ctx.get_vault_record("ukava").unwrap().is_none());
        assert!(ctx.events().is_empty());
    }

    /// Stablecoin strategy whose withdrawals always fail.
    struct FrozenWithdrawals(StablecoinStrategy);

    impl Strategy for FrozenWithdrawals {
        fn strategy_type(&self) -> StrategyType {
            self.0.strategy_type()
        }

        fn description(&self) -> &str {
            "stablecoin strategy with withdrawals halted"
        }

        fn supported_denoms(&self) -> &[String] {
            self.0.supported_denoms()
        }

        fn estimated_total_assets(
            &self,
            ctx: &TxContext<'_>,
            denom: &str,
        ) -> crate::strategy::StrategyResult<Coin> {
            self.0.estimated_total_assets(ctx, denom)
        }

        fn deposit(
            &self,
            ctx: &mut TxContext<'_>,
            amount: &Coin,
        ) -> crate::strategy::StrategyResult<()> {
            self.0.deposit(ctx, amount)
        }

        fn withdraw(
            &self,
            _ctx: &mut TxContext<'_>,
            amount: &Coin,
        ) -> crate::strategy::StrategyResult<()> {
            Err(crate::strategy::StrategyError::InsufficientManagedValue {
                denom: amount.denom.clone(),
                managed: 0,
                requested: amount.amount,
            })
        }

        fn liquidate_all(
            &self,
            ctx: &mut TxContext<'_>,
            denom: &str,
        ) -> crate::strategy::StrategyResult<Coin> {
            self.0.liquidate_all(ctx, denom)
        }
    }

    #[test]
    fn strategy_withdraw_failure_leaves_no_partial_update() {
        let ledger: Arc<dyn CustodyLedger> = Arc::new(BankLedger::new());
        let registry =
            StrategyRegistry::new().with(FrozenWithdrawals(StablecoinStrategy::new(ledger.clone())));
        let params = EarnParams::new(vec![AllowedVault::new("usdc", StrategyType::Stablecoin)]);
        let keeper = VaultKeeper::new(params, registry, ledger).unwrap();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        keeper.deposit(&mut ctx, &alice(), &usdc(1000)).unwrap();

        let vault_before = ctx.get_vault_record("usdc").unwrap();
        let share_before = ctx.get_vault_share_record(&alice(), "usdc").unwrap();
        let events_before = ctx.events().len();
        let balances = |ctx: &TxContext<'_>| {
            (
                balance(ctx, &alice(), "usdc"),
                balance(ctx, &stablecoin_custody(), "usdc"),
                balance(ctx, keeper.module_account(), "usdc"),
            )
        };
        let balances_before = balances(&ctx);
        assert_eq!(balances_before, (FUNDING - 1000, 1000, 0));

        let err = keeper.withdraw(&mut ctx, &alice(), &usdc(400)).unwrap_err();
        assert!(matches!(err, EarnError::Strategy { operation: "withdraw", .. }));
        let err = keeper.withdraw_all(&mut ctx, &alice(), "usdc").unwrap_err();
        assert!(matches!(err, EarnError::Strategy { operation: "withdraw", .. }));

        assert_eq!(ctx.get_vault_record("usdc").unwrap(), vault_before);
        assert_eq!(ctx.get_vault_share_record(&alice(), "usdc").unwrap(), share_before);
        assert_eq!(balances(&ctx), balances_before);
        assert_eq!(ctx.events().len(), events_before);
        invariants::check_all(&keeper, &ctx).unwrap();
    }

    #[test]
    fn insufficient_funds_surfaces_ledger_error() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);

        let err = keeper.deposit(&mut ctx, &alice(), &usdc(1)).unwrap_err();
        assert!(matches!(err, EarnError::Ledger(_)));
        assert_eq!(ctx.pending_writes(), 0);
    }

    #[test]
    fn liquidation_pays_holders_pro_rata() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        fund(&mut ctx, &bob());
        keeper.deposit(&mut ctx, &alice(), &usdc(600)).unwrap();
        keeper.deposit(&mut ctx, &bob(), &usdc(400)).unwrap();
        accrue(&mut ctx, 101);

        let report = keeper.liquidate_vault(&mut ctx, "usdc").unwrap();
        assert_eq!(report.recovered, usdc(1101));
        assert_eq!(report.paid, 1100);
        assert_eq!(report.holders, 2);
        assert_eq!(report.residue, 1);

        assert_eq!(balance(&ctx, &alice(), "usdc"), FUNDING - 600 + 660);
        assert_eq!(balance(&ctx, &bob(), "usdc"), FUNDING - 400 + 440);
        assert_eq!(balance(&ctx, keeper.module_account(), "usdc"), 1);
        assert!(ctx.get_vault_record("usdc").unwrap().is_none());
        assert!(ctx.vault_share_records("usdc").unwrap().is_empty());
        assert_eq!(ctx.events().last().unwrap().event_type(), "vault_liquidate");
    }

    #[test]
    fn liquidating_empty_vault_fails() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        let err = keeper.liquidate_vault(&mut ctx, "usdc").unwrap_err();
        assert!(matches!(err, EarnError::VaultRecordNotFound(_)));
    }

    #[test]
    fn vaults_summarises_every_allowed_vault() {
        let keeper = keeper();
        let db = EarnDB::open_temporary().unwrap();
        let mut ctx = db.begin(1);
        fund(&mut ctx, &alice());
        keeper.deposit(&mut ctx, &alice(), &usdc(250)).unwrap();

        let vaults = keeper.vaults(&ctx).unwrap();
        assert_eq!(vaults.len(), 3);
        assert_eq!(vaults[0].denom, "usdc");
        assert_eq!(vaults[0].total_shares, 250);
        assert_eq!(vaults[0].total_value, usdc(250));
        assert!(vaults[1].is_private_vault);
        assert_eq!(vaults[2].strategy, StrategyType::MoneyMarket);
        assert_eq!(vaults[2].total_shares, 0);
    }
}
