//! In-memory development chain with a JSON-RPC front end, a small client
//! library, and the message box contract it is exercised with.

pub mod abi;
pub mod client;
pub mod contracts;
pub mod crypto;
pub mod ledger;
pub mod node;
pub mod primitives;
pub mod rpc;
pub mod runtime;
pub mod state;
pub mod utils;

#[cfg(test)]
mod tests;
