//! The message box contract: one string in storage slot 0, a getter and a setter.

use crate::abi::{selector, Abi, AbiItem, Constructor, Event, Function, Param, ParamType, StateMutability};
use crate::contracts::CompiledContract;
use crate::runtime::assembler::{self, Assembler};
use crate::runtime::{Op, ProgramLoader};
use crate::utils::{DevnetError, Result};

pub const INITIAL_STRING: &str = "Hi there!";
pub const SET_MESSAGE: &str = "Bye there!";

const MESSAGE_SLOT: u64 = 0;

pub fn interface() -> Abi {
    Abi {
        items: vec![
            AbiItem::Constructor(Constructor {
                inputs: vec![Param::new("initialMessage", ParamType::String)],
                state_mutability: StateMutability::Nonpayable,
            }),
            AbiItem::Function(Function {
                name: "message".into(),
                inputs: vec![],
                outputs: vec![Param::new("", ParamType::String)],
                state_mutability: StateMutability::View,
            }),
            AbiItem::Function(Function {
                name: "setMessage".into(),
                inputs: vec![Param::new("newMessage", ParamType::String)],
                outputs: vec![],
                state_mutability: StateMutability::Nonpayable,
            }),
            AbiItem::Event(Event {
                name: "MessageChanged".into(),
                inputs: vec![Param::new("newMessage", ParamType::String)],
            }),
        ],
    }
}

/// Build the interface JSON and bytecode.
pub fn compile() -> Result<CompiledContract> {
    let abi = interface();
    let message = abi.function("message")?;
    let set_message = abi.function("setMessage")?;
    let changed = abi
        .events()
        .next()
        .ok_or_else(|| DevnetError::AbiError("MessageChanged event missing".into()))?;

    let mut ctor = Assembler::new();
    ctor.op(Op::CallValue)
        .op(Op::IsZero)
        .jump_if("init")
        .revert("constructor is not payable")
        .label("init")
        .op(Op::Arg(0))
        .op(Op::SStore(MESSAGE_SLOT))
        .op(Op::Stop);

    let mut body = Assembler::new();
    body.dispatch(&[(message.selector(), "message"), (set_message.selector(), "set_message")])
        .label("message")
        .op(Op::SLoad(MESSAGE_SLOT))
        .op(Op::Return(1))
        .label("set_message")
        .op(Op::CallValue)
        .op(Op::IsZero)
        .jump_if("store")
        .revert("setMessage is not payable")
        .label("store")
        .op(Op::Arg(0))
        .op(Op::Dup)
        .op(Op::SStore(MESSAGE_SLOT))
        .op(Op::Log(changed.topic()))
        .op(Op::Stop);

    let program = assembler::program(ctor, body)?;
    Ok(CompiledContract {
        interface: abi.to_json()?,
        bytecode: ProgramLoader::encode(&program)?,
    })
}

/// Selector of `setMessage(string)`, handy for raw calldata.
pub fn set_message_selector() -> [u8; 4] {
    selector("setMessage(string)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{codec, Token};
    use crate::primitives::{Address, Wei};
    use crate::runtime::{ExecutionContext, RuntimeError, Vm};
    use std::collections::BTreeMap;

    fn ctx(value: u128) -> ExecutionContext {
        ExecutionContext::new(Address([1; 20]), Address([2; 20]), Wei(value), 1_000_000)
    }

    #[test]
    fn test_interface_roundtrips_through_json() {
        let compiled = compile().unwrap();
        let abi = Abi::from_json(&compiled.interface).unwrap();
        assert_eq!(abi, interface());
        assert!(abi.function("message").unwrap().is_constant());
        assert_eq!(abi.function("setMessage").unwrap().selector(), set_message_selector());
    }

    #[test]
    fn test_constructor_then_get_and_set() {
        let compiled = compile().unwrap();
        let (program, rest) = ProgramLoader::load(&compiled.bytecode).unwrap();
        assert!(rest.is_empty());
        let abi = interface();

        let mut storage = BTreeMap::new();
        let mut c = ctx(0).with_args(&codec::encode(&[INITIAL_STRING.into()]));
        Vm::execute(&mut c, &mut storage, &program.constructor).unwrap();

        let get = abi.function("message").unwrap();
        let mut c = ctx(0).with_calldata(&get.encode_input(&[]).unwrap()).read_only();
        let out = Vm::execute(&mut c, &mut storage, &program.body).unwrap();
        assert_eq!(get.decode_output(&out).unwrap(), vec![Token::from(INITIAL_STRING)]);

        let set = abi.function("setMessage").unwrap();
        let mut c = ctx(0).with_calldata(&set.encode_input(&[SET_MESSAGE.into()]).unwrap());
        Vm::execute(&mut c, &mut storage, &program.body).unwrap();
        assert_eq!(c.logs.len(), 1);
        assert_eq!(c.logs[0].data, codec::encode(&[SET_MESSAGE.into()]));

        let mut c = ctx(0).with_calldata(&get.encode_input(&[]).unwrap()).read_only();
        let out = Vm::execute(&mut c, &mut storage, &program.body).unwrap();
        assert_eq!(get.decode_output(&out).unwrap(), vec![Token::from(SET_MESSAGE)]);
    }

    #[test]
    fn test_rejects_value_and_unknown_selector() {
        let (program, _) = ProgramLoader::load(&compile().unwrap().bytecode).unwrap();
        let mut storage = BTreeMap::new();

        let mut c = ctx(5).with_args(&codec::encode(&[INITIAL_STRING.into()]));
        let err = Vm::execute(&mut c, &mut storage, &program.constructor).unwrap_err();
        assert_eq!(err, RuntimeError::Revert("constructor is not payable".into()));

        let mut c = ctx(0).with_calldata(&[0xde, 0xad, 0xbe, 0xef]);
        let err = Vm::execute(&mut c, &mut storage, &program.body).unwrap_err();
        assert_eq!(err, RuntimeError::Revert("unknown function selector".into()));
    }
}
