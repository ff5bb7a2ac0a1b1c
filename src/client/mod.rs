//! Client library
//!
//! - `Web3` / `Eth`: accounts, balances, transactions and receipts
//! - `Contract`: deploy from an interface and bytecode, call and send methods
//! - `Provider`: in-process (`LocalProvider`) or JSON-RPC (`HttpProvider`)

pub mod contract;
pub mod provider;
pub mod web3;

pub use contract::{Contract, ContractOptions, DeployOptions, Deployer, MethodCall, SendOptions};
pub use provider::{HttpProvider, LocalProvider, Provider};
pub use web3::{Eth, Web3};
