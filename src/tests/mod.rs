//! Crate-level tests.
//!
//! - Integration tests (message box suite, in-process and over JSON-RPC)
//! - Fuzz tests (calldata, bytecode and token decoding never panic)

mod fuzz;
mod integration;
