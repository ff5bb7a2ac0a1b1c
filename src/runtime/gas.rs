//! Gas schedule.

use crate::runtime::runtime_types::Op;

pub const TX_BASE: u64 = 21_000;
pub const TX_CREATE: u64 = 53_000;
pub const TX_DATA_ZERO: u64 = 4;
pub const TX_DATA_NON_ZERO: u64 = 16;
pub const CODE_DEPOSIT_PER_BYTE: u64 = 200;

pub const SSTORE_SET: u64 = 20_000;
pub const SSTORE_RESET: u64 = 5_000;
pub const LOG_BASE: u64 = 375;
pub const LOG_DATA_PER_BYTE: u64 = 8;

/// Gas charged before any code runs.
pub fn intrinsic_gas(data: &[u8], is_create: bool) -> u64 {
    let base = if is_create { TX_CREATE } else { TX_BASE };
    data.iter().fold(base, |acc, b| {
        acc + if *b == 0 { TX_DATA_ZERO } else { TX_DATA_NON_ZERO }
    })
}

/// Static cost of an instruction. `SStore` and `Log` add dynamic costs in the VM.
pub fn op_cost(op: &Op) -> u64 {
    match op {
        Op::Push(w) => 3 + (w.len() as u64).div_ceil(32),
        Op::Pop => 2,
        Op::Dup | Op::Swap => 3,
        Op::Selector | Op::Caller | Op::CallValue => 2,
        Op::Arg(_) => 3,
        Op::SLoad(_) => 200,
        Op::SStore(_) => 0,
        Op::Eq | Op::IsZero => 3,
        Op::Jump(_) => 8,
        Op::JumpI(_) => 10,
        Op::Log(_) => LOG_BASE,
        Op::Return(_) | Op::Revert | Op::Stop => 0,
    }
}
