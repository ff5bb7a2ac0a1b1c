//! Write-back account cache over an [`AccountStore`].
//!
//! Reads fall through to the store and populate the cache. Writes stay in the
//! cache, marked dirty, until `flush`.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::state::account_db::{Account, AccountKey, AccountStore};
use crate::utils::Result;

#[derive(Debug, Clone)]
struct Slot {
    account: Account,
    dirty: bool,
}

#[derive(Clone)]
pub struct AccountCache {
    slots: Arc<DashMap<AccountKey, Slot>>,
    store: Arc<dyn AccountStore>,
}

impl AccountCache {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { slots: Arc::new(DashMap::new()), store }
    }

    pub fn get(&self, key: &AccountKey) -> Result<Option<Account>> {
        if let Some(slot) = self.slots.get(key) {
            return Ok(Some(slot.account.clone()));
        }
        let loaded = self.store.get(key)?;
        if let Some(acc) = &loaded {
            self.slots.insert(*key, Slot { account: acc.clone(), dirty: false });
        }
        Ok(loaded)
    }

    /// A missing account reads as an empty one.
    pub fn get_or_default(&self, key: &AccountKey) -> Result<Account> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn insert(&self, key: AccountKey, account: Account) -> Result<()> {
        self.slots.insert(key, Slot { account, dirty: true });
        Ok(())
    }

    pub fn dirty_count(&self) -> usize {
        self.slots.iter().filter(|s| s.dirty).count()
    }

    /// Write dirty accounts to the store.
    pub fn flush(&self) -> Result<()> {
        let mut written = 0usize;
        for mut slot in self.slots.iter_mut() {
            if slot.dirty {
                self.store.insert(*slot.key(), slot.account.clone())?;
                slot.dirty = false;
                written += 1;
            }
        }
        trace!(written, "account cache flushed");
        Ok(())
    }
}
