//! # Transaction Context
//!
//! A [`TxContext`] is the explicit state handle passed into every engine
//! operation. It layers a write set over the committed [`EarnDB`]:
//!
//! - reads check the write set first, then committed state;
//! - writes and deletes only touch the write set;
//! - [`TxContext::commit`] hands the whole write set to the database in one
//!   atomic transaction and returns the buffered events.
//!
//! Dropping a context discards it. [`TxContext::scoped`] gives the same
//! all-or-nothing behaviour to a single operation inside a longer-lived
//! context.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::db::{decode, encode, DbResult, EarnDB, Space, WriteSet};
use crate::vault::events::VaultEvent;

/// Overlay entry a staged write replaced. `None` means the key was not
/// staged at all.
type UndoEntry = ((Space, Vec<u8>), Option<Option<Vec<u8>>>);

/// Transaction-scoped view of the earn state.
pub struct TxContext<'db> {
    db: &'db EarnDB,
    height: u64,
    writes: WriteSet,
    events: Vec<VaultEvent>,
    /// Prior overlay entries for keys written inside open scopes.
    undo: Vec<UndoEntry>,
    depth: usize,
}

impl<'db> TxContext<'db> {
    pub(crate) fn new(db: &'db EarnDB, height: u64) -> Self {
        Self {
            db,
            height,
            writes: WriteSet::new(),
            events: Vec::new(),
            undo: Vec::new(),
            depth: 0,
        }
    }

    /// Block height this transaction executes at.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Number of staged writes (including deletes).
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    // -- Raw access ---------------------------------------------------------

    pub fn get(&self, space: Space, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        if let Some(staged) = self.writes.get(&(space, key.to_vec())) {
            return Ok(staged.clone());
        }
        self.db.get(space, key)
    }

    pub fn set(&mut self, space: Space, key: Vec<u8>, value: Vec<u8>) {
        self.stage((space, key), Some(value));
    }

    pub fn delete(&mut self, space: Space, key: Vec<u8>) {
        self.stage((space, key), None);
    }

    fn stage(&mut self, slot: (Space, Vec<u8>), value: Option<Vec<u8>>) {
        if self.depth == 0 {
            self.writes.insert(slot, value);
            return;
        }
        let prior = self.writes.insert(slot.clone(), value);
        self.undo.push((slot, prior));
    }

    /// Every visible entry whose key starts with `prefix`, in key order.
    /// Staged writes shadow committed values; staged deletes hide them.
    pub fn scan_prefix(&self, space: Space, prefix: &[u8]) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: std::collections::BTreeMap<Vec<u8>, Vec<u8>> =
            self.db.scan_prefix(space, prefix)?.into_iter().collect();

        for ((staged_space, key), value) in self.writes.range((space, prefix.to_vec())..) {
            if *staged_space != space || !key.starts_with(prefix) {
                break;
            }
            match value {
                Some(bytes) => {
                    merged.insert(key.clone(), bytes.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }

    // -- Typed access -------------------------------------------------------

    pub fn get_decoded<T: DeserializeOwned>(&self, space: Space, key: &[u8]) -> DbResult<Option<T>> {
        self.get(space, key)?.map(|bytes| decode(&bytes)).transpose()
    }

    pub fn set_encoded<T: Serialize>(&mut self, space: Space, key: Vec<u8>, value: &T) -> DbResult<()> {
        let bytes = encode(value)?;
        self.set(space, key, bytes);
        Ok(())
    }

    // -- Events -------------------------------------------------------------

    pub fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    /// Events emitted so far in this transaction.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    // -- Boundaries ---------------------------------------------------------

    /// Run `f` as one all-or-nothing unit. If it returns an error, every
    /// write and event it produced is discarded before the error is
    /// returned.
    ///
    /// Scopes nest. Only the writes made inside the failing scope are
    /// undone, newest first.
    pub fn scoped<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let mark = self.undo.len();
        let saved_events = self.events.len();

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if result.is_err() {
            let discarded = self.undo.len() - mark;
            for (slot, prior) in self.undo.drain(mark..).rev() {
                match prior {
                    Some(value) => {
                        self.writes.insert(slot, value);
                    }
                    None => {
                        self.writes.remove(&slot);
                    }
                }
            }
            self.events.truncate(saved_events);
            debug!(height = self.height, discarded, "scope reverted");
        }
        if self.depth == 0 {
            self.undo.clear();
        }
        result
    }

    /// Write every staged change to the database atomically and return the
    /// events emitted by this transaction.
    pub fn commit(self) -> DbResult<Vec<VaultEvent>> {
        self.db.apply(&self.writes, self.height)?;
        Ok(self.events)
    }
}
