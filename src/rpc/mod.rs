//! RPC module
//!
//! - JSON-RPC 2.0 over HTTP, `eth_` namespace plus `devnet_metrics`
//! - Server traits and client traits generated from one definition in `api`
//!
//! To serve: wrap a shared `Devnet` in `RpcServer::new()` and `start()` it.

pub mod api;
pub mod server;

pub use api::{DevnetApiClient, EthApiClient};
pub use server::{DevnetRpc, RpcServer};
