//! # Record Store
//!
//! Typed get/set/delete for [`VaultRecord`] and [`VaultShareRecord`] on a
//! [`TxContext`]. This layer does no validation; the keeper enforces every
//! invariant before it calls in here. The one policy it owns is that the
//! `update_*` helpers delete a record instead of persisting zero shares.

use super::context::TxContext;
use super::db::{DbResult, Space};
use crate::types::AccAddress;
use crate::vault::record::{VaultRecord, VaultShareRecord};

/// Separates the denom from the owner in share record keys. Denoms never
/// contain a NUL byte, so the prefix `denom || 0x00` selects one vault.
const KEY_SEPARATOR: u8 = 0x00;

fn vault_record_key(denom: &str) -> Vec<u8> {
    denom.as_bytes().to_vec()
}

fn share_record_prefix(denom: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(denom.len() + 1);
    key.extend_from_slice(denom.as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

fn share_record_key(denom: &str, owner: &AccAddress) -> Vec<u8> {
    let mut key = share_record_prefix(denom);
    key.extend_from_slice(owner.as_bytes());
    key
}

impl TxContext<'_> {
    // -- VaultRecord --------------------------------------------------------

    pub fn get_vault_record(&self, denom: &str) -> DbResult<Option<VaultRecord>> {
        self.get_decoded(Space::VaultRecords, &vault_record_key(denom))
    }

    pub fn set_vault_record(&mut self, record: &VaultRecord) -> DbResult<()> {
        self.set_encoded(Space::VaultRecords, vault_record_key(&record.denom), record)
    }

    pub fn delete_vault_record(&mut self, denom: &str) {
        self.delete(Space::VaultRecords, vault_record_key(denom));
    }

    /// Persist the record, or delete it if it holds zero shares.
    pub fn update_vault_record(&mut self, record: &VaultRecord) -> DbResult<()> {
        if record.is_empty() {
            self.delete_vault_record(&record.denom);
            return Ok(());
        }
        self.set_vault_record(record)
    }

    /// Every vault record, ordered by denom.
    pub fn vault_records(&self) -> DbResult<Vec<VaultRecord>> {
        self.scan_prefix(Space::VaultRecords, &[])?
            .iter()
            .map(|(_, bytes)| super::db::decode(bytes))
            .collect()
    }

    // -- VaultShareRecord ---------------------------------------------------

    pub fn get_vault_share_record(
        &self,
        owner: &AccAddress,
        denom: &str,
    ) -> DbResult<Option<VaultShareRecord>> {
        self.get_decoded(Space::ShareRecords, &share_record_key(denom, owner))
    }

    pub fn set_vault_share_record(&mut self, record: &VaultShareRecord) -> DbResult<()> {
        self.set_encoded(
            Space::ShareRecords,
            share_record_key(&record.denom, &record.owner),
            record,
        )
    }

    pub fn delete_vault_share_record(&mut self, owner: &AccAddress, denom: &str) {
        self.delete(Space::ShareRecords, share_record_key(denom, owner));
    }

    /// Persist the record, or delete it if it holds zero shares.
    pub fn update_vault_share_record(&mut self, record: &VaultShareRecord) -> DbResult<()> {
        if record.is_empty() {
            self.delete_vault_share_record(&record.owner, &record.denom);
            return Ok(());
        }
        self.set_vault_share_record(record)
    }

    /// Every share record of one vault, ordered by owner address bytes.
    pub fn vault_share_records(&self, denom: &str) -> DbResult<Vec<VaultShareRecord>> {
        self.scan_prefix(Space::ShareRecords, &share_record_prefix(denom))?
            .iter()
            .map(|(_, bytes)| super::db::decode(bytes))
            .collect()
    }

    /// Every share record of every vault, ordered by denom then owner.
    pub fn all_vault_share_records(&self) -> DbResult<Vec<VaultShareRecord>> {
        self.scan_prefix(Space::ShareRecords, &[])?
            .iter()
            .map(|(_, bytes)| super::db::decode(bytes))
            .collect()
    }
}
