//! # Storage Module
//!
//! Committed state for the earn module and the transaction-scoped overlay
//! that every state transition runs against.
//!
//! ## Architecture
//!
//! ```text
//! db.rs       sled persistence, one tree per record family
//! context.rs  TxContext: staged writes, events, atomic commit
//! records.rs  typed VaultRecord / VaultShareRecord accessors
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! VaultKeeper ──reads/writes──▶ TxContext ──commit()──▶ EarnDB
//!                                   │                      ▲
//!                                   └──── reads miss ──────┘
//! ```
//!
//! Nothing writes to [`EarnDB`] except [`TxContext::commit`]. A context that
//! is dropped without committing leaves the database untouched, which is how
//! the host rolls back an aborted transaction.

pub mod context;
pub mod db;
pub mod records;

pub use context::TxContext;
pub use db::{DbError, DbResult, EarnDB, Space};
