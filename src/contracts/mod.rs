//! Contracts shipped with the devnet.

pub mod inbox;

/// Output of compiling a contract: the interface JSON and deployable bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContract {
    pub interface: String,
    pub bytecode: Vec<u8>,
}
