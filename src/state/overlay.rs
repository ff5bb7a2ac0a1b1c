//! Per-transaction write set on top of the account cache.
//!
//! The executor stages every mutation here. `commit` publishes the touched
//! accounts to the cache; dropping the overlay discards them, which is how a
//! failed transaction is rolled back.

use std::collections::BTreeMap;

use crate::state::account_cache::AccountCache;
use crate::state::account_db::{Account, AccountKey};
use crate::utils::Result;

pub struct StateOverlay<'a> {
    cache: &'a AccountCache,
    touched: BTreeMap<AccountKey, Account>,
}

impl<'a> StateOverlay<'a> {
    pub fn new(cache: &'a AccountCache) -> Self {
        Self { cache, touched: BTreeMap::new() }
    }

    pub fn get(&self, key: &AccountKey) -> Result<Account> {
        match self.touched.get(key) {
            Some(acc) => Ok(acc.clone()),
            None => self.cache.get_or_default(key),
        }
    }

    pub fn get_mut(&mut self, key: &AccountKey) -> Result<&mut Account> {
        if !self.touched.contains_key(key) {
            let acc = self.cache.get_or_default(key)?;
            self.touched.insert(*key, acc);
        }
        // present: inserted above when missing
        Ok(self.touched.entry(*key).or_default())
    }

    pub fn touched(&self) -> impl Iterator<Item = &AccountKey> {
        self.touched.keys()
    }

    pub fn commit(self) -> Result<()> {
        for (k, acc) in self.touched {
            self.cache.insert(k, acc)?;
        }
        Ok(())
    }
}
