//! Walks two depositors through a usdc vault: deposits, accrued yield, a
//! partial withdrawal, and a full exit.
//!
//! ```text
//! cargo run -p earn-vault --example walkthrough
//! ```

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use earn_vault::config::strategy_account_name;
use earn_vault::ledger::{BankLedger, CustodyLedger};
use earn_vault::logging::{init_logging, LogFormat};
use earn_vault::storage::EarnDB;
use earn_vault::strategy::{StrategyRegistry, StrategyType};
use earn_vault::types::{AccAddress, Coin};
use earn_vault::vault::{invariants, EarnParams, VaultKeeper};

const PARAMS: &str = r#"{
  "allowed_vaults": [
    { "denom": "usdc", "strategy": "stablecoin" }
  ]
}"#;

fn main() -> Result<()> {
    init_logging("info", LogFormat::Pretty)?;

    let ledger: Arc<dyn CustodyLedger> = Arc::new(BankLedger::new());
    let params = EarnParams::from_json_str(PARAMS)?;
    let keeper = VaultKeeper::new(params, StrategyRegistry::standard(ledger.clone()), ledger)?;

    let db = EarnDB::open_temporary()?;
    let alice = AccAddress::module("alice");
    let bob = AccAddress::module("bob");
    let custody = AccAddress::module(&strategy_account_name(StrategyType::Stablecoin.as_str()));

    let mut ctx = db.begin(1);
    BankLedger.mint(&mut ctx, &alice, &Coin::new("usdc", 5_000))?;
    BankLedger.mint(&mut ctx, &bob, &Coin::new("usdc", 5_000))?;
    keeper.deposit(&mut ctx, &alice, &Coin::new("usdc", 3_000))?;
    keeper.deposit(&mut ctx, &bob, &Coin::new("usdc", 1_000))?;
    ctx.commit()?;

    let mut ctx = db.begin(2);
    BankLedger.mint(&mut ctx, &custody, &Coin::new("usdc", 400))?;
    info!(
        alice = %keeper.vault_account_value(&ctx, &alice, "usdc")?,
        bob = %keeper.vault_account_value(&ctx, &bob, "usdc")?,
        "yield accrued"
    );

    let out = keeper.withdraw(&mut ctx, &alice, &Coin::new("usdc", 1_100))?;
    info!(shares = out.shares, paid = %out.paid, "alice withdrew");

    let out = keeper.withdraw_all(&mut ctx, &bob, "usdc")?;
    info!(shares = out.shares, paid = %out.paid, "bob exited");

    invariants::check_all(&keeper, &ctx)?;
    for event in ctx.commit()? {
        info!(kind = event.event_type(), attributes = ?event.attributes(), "event");
    }

    for vault in keeper.vaults(&db.begin(3))? {
        info!(
            denom = %vault.denom,
            shares = vault.total_shares,
            value = %vault.total_value,
            "vault"
        );
    }
    Ok(())
}
