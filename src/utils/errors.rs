use thiserror::Error;

use crate::primitives::{Address, H256};
use crate::runtime::RuntimeError;

/// Unified error type for the devnet, its RPC layer and the client library
#[derive(Error, Debug)]
pub enum DevnetError {
    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("State error: {0}")]
    StateError(String),

    #[error("Crypto error: {0}")]
    CryptoError(String),

    #[error("ABI error: {0}")]
    AbiError(String),

    #[error("Execution error: {0}")]
    ExecutionError(#[from] RuntimeError),

    #[error("Unknown account: {0}")]
    UnknownAccount(Address),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(H256),

    #[error("Transaction {hash} failed: {reason}")]
    TransactionFailed { hash: H256, reason: String },

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, DevnetError>;
