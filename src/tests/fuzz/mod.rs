//! Fuzz tests for calldata, bytecode and token decoding.

use std::collections::BTreeMap;

use rand::Rng;

use crate::abi::{codec, ParamType};
use crate::contracts::inbox;
use crate::primitives::{Address, Wei};
use crate::runtime::{ExecutionContext, ProgramLoader, Vm};

#[test]
fn fuzz_token_decoding() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let len = rng.gen_range(0..64);
        let bogus: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let _ = codec::split(&bogus);
        let _ = codec::decode(&[ParamType::String], &bogus);
    }
}

#[test]
fn fuzz_program_loading() {
    let mut rng = rand::thread_rng();
    let code = inbox::compile().unwrap().bytecode;
    for _ in 0..500 {
        let mut bogus = code.clone();
        let i = rng.gen_range(0..bogus.len());
        bogus[i] = rng.gen();
        bogus.truncate(rng.gen_range(0..=bogus.len()));
        let _ = ProgramLoader::load(&bogus);
    }
}

#[test]
fn fuzz_inbox_calldata() {
    let mut rng = rand::thread_rng();
    let (program, _) = ProgramLoader::load(&inbox::compile().unwrap().bytecode).unwrap();
    for _ in 0..500 {
        let len = rng.gen_range(0..48);
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let mut ctx = ExecutionContext::new(Address([1; 20]), Address([2; 20]), Wei::ZERO, 100_000)
            .with_calldata(&data);
        let mut storage = BTreeMap::new();
        // random selectors almost never match, so these revert
        let _ = Vm::execute(&mut ctx, &mut storage, &program.body);
        assert!(ctx.gas_used <= 100_000);
    }
}
