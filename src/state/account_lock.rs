//! Striped async account locks.
//!
//! Every address hashes (xxhash64) onto one of a fixed set of stripes. A
//! transaction locks the stripes of every account it touches, always in
//! ascending stripe order, so two transactions can never wait on each other
//! in a cycle. Two accounts sharing a stripe just serialize.

use std::hash::Hasher;
use std::sync::Arc;

use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};
use twox_hash::XxHash64;

use crate::state::account_db::AccountKey;

pub const DEFAULT_SHARDS: usize = 64;

/// Held stripes; released on drop.
pub struct LockGuard {
    held: Vec<OwnedMutexGuard<()>>,
}

impl LockGuard {
    /// Number of distinct stripes held.
    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[derive(Clone)]
pub struct AccountLocks {
    stripes: Arc<[Arc<TokioMutex<()>>]>,
}

impl AccountLocks {
    pub fn new(stripes: usize) -> Self {
        let stripes = (0..stripes.max(1)).map(|_| Arc::new(TokioMutex::new(()))).collect();
        Self { stripes }
    }

    pub fn stripe_of(&self, key: &AccountKey) -> usize {
        let mut h = XxHash64::with_seed(0);
        h.write(key.as_bytes());
        (h.finish() % self.stripes.len() as u64) as usize
    }

    /// Lock every stripe covering `keys`.
    pub async fn acquire(&self, keys: Vec<AccountKey>) -> LockGuard {
        let mut ids: Vec<usize> = keys.iter().map(|k| self.stripe_of(k)).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut held = Vec::with_capacity(ids.len());
        for id in ids {
            held.push(Arc::clone(&self.stripes[id]).lock_owned().await);
        }
        LockGuard { held }
    }
}

impl Default for AccountLocks {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}
