//! # Vault Module: Share Accounting
//!
//! Pools deposits of one asset denom into a vault backed by a strategy and
//! tracks each depositor's proportional claim as shares.
//!
//! ## Architecture
//!
//! ```text
//! conversion.rs : floor-rounded asset <-> share math
//! dust.rs       : sweep of unredeemable share remainders
//! params.rs     : governance-approved vaults (AllowedVault)
//! record.rs     : VaultRecord / VaultShareRecord
//! events.rs     : events emitted for indexing
//! keeper.rs     : deposit / withdraw / liquidate orchestration and queries
//! invariants.rs : record-store consistency checks
//! error.rs      : EarnError
//! ```
//!
//! State lives in the record store ([`crate::storage`]); assets live with
//! the strategies. A vault's rate is always `strategy value / total shares`,
//! read live, so yield never needs to be booked here.

pub mod conversion;
pub mod dust;
pub mod error;
pub mod events;
pub mod invariants;
pub mod keeper;
pub mod params;
pub mod record;

pub use conversion::{convert_to_assets, convert_to_shares, ConversionError, ShareRate};
pub use dust::DustOutcome;
pub use error::{EarnError, EarnResult};
pub use events::VaultEvent;
pub use keeper::{LiquidationReport, VaultKeeper, VaultSummary, Withdrawal};
pub use params::{AllowedVault, EarnParams, ParamsError};
pub use record::{VaultRecord, VaultShareRecord};
