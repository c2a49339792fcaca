// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Earn Vault: Share Accounting Engine
//!
//! Many accounts pool a single asset into a vault, a strategy puts the pool
//! to work, and every depositor holds fungible *shares* that represent a
//! proportional claim on whatever the strategy currently manages. This crate
//! is the accounting core of that arrangement: it owns the share records,
//! the asset/share conversion math, and the deposit/withdraw state
//! transitions.
//!
//! ## Architecture
//!
//! - **types**: Coins and bech32 account addresses.
//! - **storage**: sled-backed committed state plus the transaction-scoped
//!   overlay every operation runs against.
//! - **ledger**: Moves coins between accounts and module
//!   accounts inside the same transaction boundary.
//! - **strategy**: The pluggable strategy contract and its registry.
//! - **vault**: Conversion math, dust policy, records, events, and the
//!   keeper that sequences it all.
//! - **config**: Module constants.
//! - **logging**: `tracing` subscriber setup.
//!
//! ## Design Philosophy
//!
//! 1. Every conversion floors in the vault's favour. A depositor can lose a
//!    fraction of a unit to rounding; the vault can never end up owing more
//!    than its strategy holds.
//! 2. No ambient state. Every operation receives an explicit [`TxContext`]
//!    and either all of its writes land or none do.
//! 3. The keeper never knows which strategy it is talking to.
//!
//! [`TxContext`]: storage::TxContext

pub mod config;
pub mod ledger;
pub mod logging;
pub mod storage;
pub mod strategy;
pub mod types;
pub mod vault;
