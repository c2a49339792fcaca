//! # EarnDB: Persistent Storage Engine
//!
//! The committed state of the earn module, built on sled's embedded
//! key-value store.
//!
//! ## Tree Layout
//!
//! | Tree            | Key                              | Value                      |
//! |-----------------|----------------------------------|----------------------------|
//! | `vault_records` | `denom` (UTF-8)                  | `bincode(VaultRecord)`     |
//! | `share_records` | `denom` `0x00` `owner` (20B)     | `bincode(VaultShareRecord)`|
//! | `balances`      | `owner` (20B) `denom` (UTF-8)    | `bincode(u128)`            |
//! | `metadata`      | key (UTF-8)                      | value (bytes)              |
//!
//! Share records lead with the denom so every holder of one vault is a
//! single prefix scan.
//!
//! ## Atomicity
//!
//! [`EarnDB::apply`] writes a whole transaction overlay across all trees in
//! one sled multi-tree transaction. Either every record of a deposit or
//! withdrawal lands on disk or none does.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::context::TxContext;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("commit aborted")]
    CommitAborted,
}

pub type DbResult<T> = Result<T, DbError>;

/// Staged writes keyed by record family and key. `None` is a delete.
pub(crate) type WriteSet = BTreeMap<(Space, Vec<u8>), Option<Vec<u8>>>;

/// Record families, one sled tree each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Space {
    VaultRecords,
    ShareRecords,
    Balances,
}

/// Well-known key in the `metadata` tree for the last committed height.
const META_LAST_COMMIT_HEIGHT: &[u8] = b"last_commit_height";

pub(crate) fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// EarnDB
// ---------------------------------------------------------------------------

/// Persistent storage for vault records, share records, and custody
/// balances.
///
/// Cloning is cheap: sled handles are reference counted, so every clone
/// points at the same database.
#[derive(Debug, Clone)]
pub struct EarnDB {
    db: Db,
    vault_records: Tree,
    share_records: Tree,
    balances: Tree,
    metadata: Tree,
}

impl EarnDB {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let vault_records = db.open_tree("vault_records")?;
        let share_records = db.open_tree("share_records")?;
        let balances = db.open_tree("balances")?;
        let metadata = db.open_tree("metadata")?;

        Ok(Self {
            db,
            vault_records,
            share_records,
            balances,
            metadata,
        })
    }

    /// Start a transaction at the given block height.
    pub fn begin(&self, height: u64) -> TxContext<'_> {
        TxContext::new(self, height)
    }

    fn tree(&self, space: Space) -> &Tree {
        match space {
            Space::VaultRecords => &self.vault_records,
            Space::ShareRecords => &self.share_records,
            Space::Balances => &self.balances,
        }
    }

    // -- Reads --------------------------------------------------------------

    /// Read a committed value.
    pub fn get(&self, space: Space, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        Ok(self.tree(space).get(key)?.map(|v| v.to_vec()))
    }

    /// All committed entries whose key starts with `prefix`, in key order.
    pub fn scan_prefix(&self, space: Space, prefix: &[u8]) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries = Vec::new();
        for result in self.tree(space).scan_prefix(prefix) {
            let (key, value) = result?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    /// Height of the last committed transaction, if any.
    pub fn last_commit_height(&self) -> DbResult<Option<u64>> {
        match self.metadata.get(META_LAST_COMMIT_HEIGHT)? {
            Some(bytes) => {
                let height = u64::from_be_bytes(
                    bytes
                        .as_ref()
                        .try_into()
                        .map_err(|_| DbError::Serialization("invalid height bytes".to_string()))?,
                );
                Ok(Some(height))
            }
            None => Ok(None),
        }
    }

    pub fn vault_record_count(&self) -> usize {
        self.vault_records.len()
    }

    pub fn share_record_count(&self) -> usize {
        self.share_records.len()
    }

    // -- Writes -------------------------------------------------------------

    /// Apply a transaction's staged writes and record its height, atomically
    /// across every tree.
    pub(crate) fn apply(&self, writes: &WriteSet, height: u64) -> DbResult<()> {
        let height_bytes = height.to_be_bytes().to_vec();

        let result: Result<(), TransactionError<()>> = (
            &self.vault_records,
            &self.share_records,
            &self.balances,
            &self.metadata,
        )
            .transaction(
                |(vaults, shares, balances, metadata)| -> ConflictableTransactionResult<(), ()> {
                    for ((space, key), value) in writes {
                        let tree = match space {
                            Space::VaultRecords => vaults,
                            Space::ShareRecords => shares,
                            Space::Balances => balances,
                        };
                        match value {
                            Some(bytes) => {
                                tree.insert(key.as_slice(), bytes.as_slice())?;
                            }
                            None => {
                                tree.remove(key.as_slice())?;
                            }
                        }
                    }
                    metadata.insert(META_LAST_COMMIT_HEIGHT, height_bytes.as_slice())?;
                    Ok(())
                },
            );

        result.map_err(|e| match e {
            TransactionError::Abort(()) => DbError::CommitAborted,
            TransactionError::Storage(e) => DbError::Sled(e),
        })?;

        debug!(height, writes = writes.len(), "transaction applied");
        Ok(())
    }

    /// Force a flush of all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
