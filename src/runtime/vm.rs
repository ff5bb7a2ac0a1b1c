//! Stack VM for devnet contracts.
//!
//! Words are byte strings. Comparisons produce encoded bool tokens. A word
//! holding one token is falsy when the token is `false`, zero, an empty string
//! or the zero address; any other word is falsy when all its bytes are zero.

use std::collections::BTreeMap;

use crate::abi::{codec, Token};
use crate::runtime::gas::{self, op_cost};
use crate::runtime::runtime_types::{ExecutionContext, Log, Op, RuntimeError};

pub const MAX_STACK: usize = 1024;

fn bool_word(b: bool) -> Vec<u8> {
    codec::encode(&[Token::Bool(b)])
}

fn is_truthy(word: &[u8]) -> bool {
    match codec::split(word).as_deref() {
        Ok([raw]) => match codec::decode_token(raw) {
            Ok(Token::Bool(b)) => b,
            Ok(Token::Uint(v)) => v != 0,
            Ok(Token::String(s)) => !s.is_empty(),
            Ok(Token::Address(a)) => !a.is_zero(),
            Err(_) => word.iter().any(|b| *b != 0),
        },
        _ => word.iter().any(|b| *b != 0),
    }
}

fn revert_reason(word: &[u8]) -> String {
    match codec::decode(&[crate::abi::ParamType::String], word) {
        Ok(mut t) => t.pop().and_then(Token::into_string).unwrap_or_default(),
        Err(_) => format!("0x{}", hex::encode(word)),
    }
}

struct Stack {
    words: Vec<Vec<u8>>,
}

impl Stack {
    fn push(&mut self, w: Vec<u8>, pc: usize) -> Result<(), RuntimeError> {
        if self.words.len() >= MAX_STACK {
            return Err(RuntimeError::StackOverflow(pc));
        }
        self.words.push(w);
        Ok(())
    }

    fn pop(&mut self, pc: usize) -> Result<Vec<u8>, RuntimeError> {
        self.words.pop().ok_or(RuntimeError::StackUnderflow(pc))
    }
}

pub struct Vm;

impl Vm {
    /// Run `code` against `storage`. Returns the output on `Return`/`Stop` or
    /// falling off the end. Gas and logs accumulate in `ctx`.
    pub fn execute(
        ctx: &mut ExecutionContext,
        storage: &mut BTreeMap<u64, Vec<u8>>,
        code: &[Op],
    ) -> Result<Vec<u8>, RuntimeError> {
        let args: Vec<Vec<u8>> = codec::split(&ctx.args)
            .map(|v| v.into_iter().map(<[u8]>::to_vec).collect())
            .map_err(|e| RuntimeError::InvalidCalldata(e.to_string()))?;

        let mut stack = Stack { words: Vec::new() };
        let mut pc = 0usize;

        while let Some(op) = code.get(pc) {
            ctx.charge(op_cost(op))?;
            let mut next = pc + 1;

            match op {
                Op::Push(w) => stack.push(w.clone(), pc)?,
                Op::Pop => {
                    stack.pop(pc)?;
                }
                Op::Dup => {
                    let w = stack.pop(pc)?;
                    stack.push(w.clone(), pc)?;
                    stack.push(w, pc)?;
                }
                Op::Swap => {
                    let a = stack.pop(pc)?;
                    let b = stack.pop(pc)?;
                    stack.push(a, pc)?;
                    stack.push(b, pc)?;
                }
                Op::Selector => {
                    let sel = ctx.selector.map(|s| s.to_vec()).unwrap_or_default();
                    stack.push(sel, pc)?;
                }
                Op::Arg(i) => {
                    let w = args.get(*i as usize).cloned().ok_or_else(|| {
                        RuntimeError::InvalidCalldata(format!("missing argument {}", i))
                    })?;
                    stack.push(w, pc)?;
                }
                Op::Caller => stack.push(codec::encode(&[Token::Address(ctx.caller)]), pc)?,
                Op::CallValue => stack.push(codec::encode(&[Token::Uint(ctx.value.0)]), pc)?,
                Op::SLoad(slot) => {
                    let w = storage.get(slot).cloned().unwrap_or_default();
                    stack.push(w, pc)?;
                }
                Op::SStore(slot) => {
                    if ctx.read_only {
                        return Err(RuntimeError::WriteProtection);
                    }
                    let w = stack.pop(pc)?;
                    let cost = if storage.contains_key(slot) { gas::SSTORE_RESET } else { gas::SSTORE_SET };
                    ctx.charge(cost)?;
                    storage.insert(*slot, w);
                }
                Op::Eq => {
                    let a = stack.pop(pc)?;
                    let b = stack.pop(pc)?;
                    stack.push(bool_word(a == b), pc)?;
                }
                Op::IsZero => {
                    let a = stack.pop(pc)?;
                    stack.push(bool_word(!is_truthy(&a)), pc)?;
                }
                Op::Jump(t) => next = *t as usize,
                Op::JumpI(t) => {
                    if is_truthy(&stack.pop(pc)?) {
                        next = *t as usize;
                    }
                }
                Op::Log(topic) => {
                    if ctx.read_only {
                        return Err(RuntimeError::WriteProtection);
                    }
                    let data = stack.pop(pc)?;
                    ctx.charge(gas::LOG_DATA_PER_BYTE * data.len() as u64)?;
                    ctx.logs.push(Log { address: ctx.address, topic: topic.to_vec(), data });
                }
                Op::Return(n) => {
                    let mut words = Vec::with_capacity(*n as usize);
                    for _ in 0..*n {
                        words.push(stack.pop(pc)?);
                    }
                    words.reverse();
                    return Ok(words.concat());
                }
                Op::Revert => {
                    let w = stack.pop(pc)?;
                    return Err(RuntimeError::Revert(revert_reason(&w)));
                }
                Op::Stop => return Ok(Vec::new()),
            }

            if next >= code.len() && next != pc + 1 {
                return Err(RuntimeError::InvalidJump(next as u32));
            }
            pc = next;
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Address, Wei};

    fn ctx(gas: u64) -> ExecutionContext {
        ExecutionContext::new(Address([1; 20]), Address([2; 20]), Wei(5), gas)
    }

    #[test]
    fn test_store_and_return_arg() {
        let mut c = ctx(100_000).with_args(&codec::encode(&["hello".into()]));
        let mut storage = BTreeMap::new();
        let code = vec![Op::Arg(0), Op::SStore(0), Op::SLoad(0), Op::Return(1)];
        let out = Vm::execute(&mut c, &mut storage, &code).unwrap();
        assert_eq!(out, codec::encode(&["hello".into()]));
        assert!(c.gas_used > gas::SSTORE_SET);
    }

    #[test]
    fn test_conditional_jump() {
        let mut c = ctx(10_000);
        let mut storage = BTreeMap::new();
        let code = vec![
            Op::Push(vec![1]),
            Op::Push(vec![1]),
            Op::Eq,
            Op::JumpI(6),
            Op::Push(codec::encode(&["no".into()])),
            Op::Revert,
            Op::Push(vec![42]),
            Op::Return(1),
        ];
        assert_eq!(Vm::execute(&mut c, &mut storage, &code).unwrap(), vec![42]);
    }

    #[test]
    fn test_revert_reason_decoded() {
        let mut c = ctx(10_000);
        let code = vec![Op::Push(codec::encode(&["nope".into()])), Op::Revert];
        let err = Vm::execute(&mut c, &mut BTreeMap::new(), &code).unwrap_err();
        assert_eq!(err, RuntimeError::Revert("nope".into()));
    }

    #[test]
    fn test_out_of_gas_in_loop() {
        let mut c = ctx(1_000);
        let code = vec![Op::Jump(0)];
        assert_eq!(Vm::execute(&mut c, &mut BTreeMap::new(), &code), Err(RuntimeError::OutOfGas));
        assert_eq!(c.gas_used, 1_000);
    }

    #[test]
    fn test_read_only_rejects_store() {
        let mut c = ctx(100_000).read_only();
        let code = vec![Op::Push(vec![1]), Op::SStore(0)];
        assert_eq!(Vm::execute(&mut c, &mut BTreeMap::new(), &code), Err(RuntimeError::WriteProtection));
    }

    #[test]
    fn test_underflow_and_missing_arg() {
        let mut c = ctx(1_000);
        assert_eq!(Vm::execute(&mut c, &mut BTreeMap::new(), &[Op::Pop]), Err(RuntimeError::StackUnderflow(0)));
        let mut c = ctx(1_000);
        assert!(matches!(
            Vm::execute(&mut c, &mut BTreeMap::new(), &[Op::Arg(0)]),
            Err(RuntimeError::InvalidCalldata(_))
        ));
    }

    #[test]
    fn test_log_and_caller() {
        let mut c = ctx(10_000);
        let code = vec![Op::Caller, Op::Log([0xaa; 4]), Op::CallValue, Op::Return(1)];
        let out = Vm::execute(&mut c, &mut BTreeMap::new(), &code).unwrap();
        assert_eq!(out, codec::encode(&[Token::Uint(5)]));
        assert_eq!(c.logs.len(), 1);
        assert_eq!(c.logs[0].data, codec::encode(&[Token::Address(Address([1; 20]))]));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&[]));
        assert!(!is_truthy(&[0, 0]));
        assert!(!is_truthy(&bool_word(false)));
        assert!(is_truthy(&bool_word(true)));
        assert!(is_truthy(&[0, 3]));
        assert!(!is_truthy(&codec::encode(&[Token::Uint(0)])));
        assert!(is_truthy(&codec::encode(&[Token::Uint(7)])));
        assert!(!is_truthy(&codec::encode(&["".into()])));
    }
}
