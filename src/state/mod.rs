pub mod account_db;
pub mod account_cache;
pub mod account_lock;
pub mod overlay;

pub use account_db::{Account, AccountKey, AccountStore, InMemAccountStore};
pub use account_cache::AccountCache;
pub use account_lock::{AccountLocks, LockGuard};
pub use overlay::StateOverlay;
