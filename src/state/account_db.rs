//! Account DB abstractions.
//! - Account struct (balance, nonce, code, storage)
//! - AccountStore trait (pluggable persistence engine)
//! - InMemAccountStore (HashMap behind a lock, the devnet's only backend)

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::primitives::{Address, Wei};
use crate::utils::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// balance in wei
    pub balance: Wei,
    /// number of transactions sent from this account
    pub nonce: u64,
    /// program bytecode; empty for externally owned accounts
    pub code: Vec<u8>,
    /// contract storage: slot -> encoded word
    pub storage: BTreeMap<u64, Vec<u8>>,
}

impl Account {
    pub fn new(balance: Wei) -> Self {
        Self { balance, ..Default::default() }
    }

    pub fn is_contract(&self) -> bool {
        !self.code.is_empty()
    }
}

/// Account key type
pub type AccountKey = Address;

/// Trait for an account persistence engine.
pub trait AccountStore: Send + Sync + 'static {
    fn get(&self, key: &AccountKey) -> Result<Option<Account>>;
    fn insert(&self, key: AccountKey, account: Account) -> Result<()>;
}

/// In-memory account store
#[derive(Debug, Default, Clone)]
pub struct InMemAccountStore {
    inner: Arc<RwLock<HashMap<AccountKey, Account>>>,
}

impl InMemAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemAccountStore {
    fn get(&self, key: &AccountKey) -> Result<Option<Account>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn insert(&self, key: AccountKey, account: Account) -> Result<()> {
        self.inner.write().insert(key, account);
        Ok(())
    }
}
