//! Common runtime types: instructions, execution context, logs, errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abi::Selector;
use crate::primitives::{Address, Wei};
use crate::utils::serde_helpers::{as_hex, from_hex};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    #[error("out of gas")]
    OutOfGas,
    #[error("stack underflow at pc {0}")]
    StackUnderflow(usize),
    #[error("stack overflow at pc {0}")]
    StackOverflow(usize),
    #[error("invalid jump target {0}")]
    InvalidJump(u32),
    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),
    #[error("state write in read-only call")]
    WriteProtection,
    #[error("contract already exists at {0}")]
    ContractCollision(Address),
    #[error("execution reverted: {0}")]
    Revert(String),
}

/// One VM instruction. Stack words are byte strings, normally encoded ABI tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// push a literal word
    Push(Vec<u8>),
    Pop,
    Dup,
    Swap,
    /// push the 4-byte function selector of the calldata (empty for none)
    Selector,
    /// push the raw i-th argument token
    Arg(u8),
    /// push the caller as an address token
    Caller,
    /// push the transferred value as a uint token
    CallValue,
    SLoad(u64),
    SStore(u64),
    /// pop two words, push a bool token
    Eq,
    /// pop one word, push a bool token of its falsiness
    IsZero,
    Jump(u32),
    /// pop a condition, jump when truthy
    JumpI(u32),
    /// pop a word and emit it as log data under `topic`
    Log(Selector),
    /// pop `n` words and return their concatenation (push order)
    Return(u8),
    /// pop a word and abort with it as the reason
    Revert,
    Stop,
}

/// A contract: constructor code run once at deployment, body run on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Program {
    pub constructor: Vec<Op>,
    pub body: Vec<Op>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    #[serde(serialize_with = "as_hex", deserialize_with = "from_hex")]
    pub topic: Vec<u8>,
    #[serde(serialize_with = "as_hex", deserialize_with = "from_hex")]
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct ExecutionContext {
    pub caller: Address,
    pub address: Address,
    pub value: Wei,
    pub selector: Option<Selector>,
    /// encoded argument tokens (without the selector)
    pub args: Vec<u8>,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub read_only: bool,
    pub logs: Vec<Log>,
}

impl ExecutionContext {
    pub fn new(caller: Address, address: Address, value: Wei, gas_limit: u64) -> Self {
        Self {
            caller,
            address,
            value,
            selector: None,
            args: Vec::new(),
            gas_limit,
            gas_used: 0,
            read_only: false,
            logs: Vec::new(),
        }
    }

    /// Split `selector || args` calldata into the context.
    pub fn with_calldata(mut self, data: &[u8]) -> Self {
        if data.len() >= 4 {
            self.selector = Some([data[0], data[1], data[2], data[3]]);
            self.args = data[4..].to_vec();
        } else {
            self.selector = None;
            self.args = Vec::new();
        }
        self
    }

    pub fn with_args(mut self, args: &[u8]) -> Self {
        self.args = args.to_vec();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn gas_left(&self) -> u64 {
        self.gas_limit.saturating_sub(self.gas_used)
    }

    pub fn charge(&mut self, amount: u64) -> Result<(), RuntimeError> {
        let next = self.gas_used.saturating_add(amount);
        if next > self.gas_limit {
            self.gas_used = self.gas_limit;
            return Err(RuntimeError::OutOfGas);
        }
        self.gas_used = next;
        Ok(())
    }
}
