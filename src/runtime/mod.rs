//! Runtime module: executes contract creation, contract calls and transfers.
//!
//! Exposes:
//! - Executor: validates and applies signed transactions (lock-based).
//! - ProgramLoader: decodes and validates bytecode.
//! - Vm: interpreter for contract instructions.
//! - Assembler: builds programs from labelled instruction lists.
//! - runtime_types: common types used in execution.

pub mod assembler;
pub mod executor;
pub mod gas;
pub mod program_loader;
pub mod runtime_types;
pub mod vm;

pub use assembler::Assembler;
pub use executor::{CallRequest, Executor, ExecutorConfig, Receipt, SignedTransaction, Transaction};
pub use program_loader::ProgramLoader;
pub use runtime_types::{ExecutionContext, Log, Op, Program, RuntimeError};
pub use vm::Vm;
