//! # Module Configuration & Constants
//!
//! Every magic value the earn module depends on lives here. Governance
//! parameters (which vaults exist, which strategy backs them) are runtime
//! configuration and live in [`crate::vault::params`]; the values below are
//! compiled in and change only with a software upgrade.

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Name of the module account that holds vault custody between the user
/// and the strategy.
pub const MODULE_NAME: &str = "earn";

/// Prefix for strategy custody accounts. The full name is
/// `earn/strategy/<strategy name>`.
pub const STRATEGY_ACCOUNT_PREFIX: &str = "earn/strategy/";

/// Human-readable part of every bech32 account address.
pub const ACCOUNT_HRP: &str = "earn";

/// Account addresses are the first 20 bytes of a SHA-256 digest.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Shortest valid denom.
pub const MIN_DENOM_LENGTH: usize = 3;

/// Longest valid denom.
pub const MAX_DENOM_LENGTH: usize = 128;

/// Stablecoins the stablecoin strategy accepts out of the box.
pub const DEFAULT_STABLECOIN_DENOMS: &[&str] = &["busd", "usdc", "usdt", "dai"];

/// Assets the money market strategy supplies out of the box.
pub const DEFAULT_MONEY_MARKET_DENOMS: &[&str] = &["ukava", "usdx", "bnb", "btcb"];

// ---------------------------------------------------------------------------
// Dust
// ---------------------------------------------------------------------------

/// Smallest indivisible amount of any underlying asset. A share balance
/// worth less than this is dust.
pub const MIN_REDEEMABLE_ASSETS: u128 = 1;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub const EVENT_TYPE_VAULT_DEPOSIT: &str = "vault_deposit";
pub const EVENT_TYPE_VAULT_WITHDRAW: &str = "vault_withdraw";
pub const EVENT_TYPE_VAULT_LIQUIDATE: &str = "vault_liquidate";

pub const ATTRIBUTE_KEY_VAULT_DENOM: &str = "vault_denom";
pub const ATTRIBUTE_KEY_OWNER: &str = "owner";
pub const ATTRIBUTE_KEY_SHARES: &str = "shares";
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";
pub const ATTRIBUTE_KEY_HOLDERS: &str = "holders";

/// Returns the custody account name for a strategy.
pub fn strategy_account_name(strategy_name: &str) -> String {
    format!("{STRATEGY_ACCOUNT_PREFIX}{strategy_name}")
}
