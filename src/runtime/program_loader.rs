//! Program loader: decodes and validates contract bytecode.
//!
//! Bytecode layout: `MAGIC || bincode(Program)`. Deployment data may carry
//! encoded constructor arguments after the program; `load` hands them back.

use std::io::Cursor;

use bincode::Options;

use crate::runtime::runtime_types::{Op, Program, RuntimeError};

pub const MAGIC: &[u8; 4] = b"MBX\x01";

/// Upper bound on decoded program size.
pub const MAX_CODE_SIZE: u64 = 24 * 1024;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_CODE_SIZE)
        .allow_trailing_bytes()
}

pub struct ProgramLoader;

impl ProgramLoader {
    /// Decode and validate `bytes`, returning the program and any trailing bytes.
    pub fn load(bytes: &[u8]) -> Result<(Program, &[u8]), RuntimeError> {
        let payload = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| RuntimeError::InvalidProgram("missing bytecode header".into()))?;

        let mut cursor = Cursor::new(payload);
        let program: Program = codec()
            .deserialize_from(&mut cursor)
            .map_err(|e| RuntimeError::InvalidProgram(e.to_string()))?;
        let consumed = cursor.position() as usize;

        Self::validate(&program.constructor)?;
        Self::validate(&program.body)?;
        Ok((program, &payload[consumed..]))
    }

    /// Encode a program as bytecode.
    pub fn encode(program: &Program) -> Result<Vec<u8>, RuntimeError> {
        let mut out = MAGIC.to_vec();
        let body = codec()
            .serialize(program)
            .map_err(|e| RuntimeError::InvalidProgram(e.to_string()))?;
        out.extend(body);
        Ok(out)
    }

    /// The code stored on chain after deployment: the body alone.
    pub fn runtime_code(program: &Program) -> Result<Vec<u8>, RuntimeError> {
        Self::encode(&Program { constructor: Vec::new(), body: program.body.clone() })
    }

    fn validate(ops: &[Op]) -> Result<(), RuntimeError> {
        for op in ops {
            if let Op::Jump(t) | Op::JumpI(t) = op {
                if *t as usize >= ops.len() {
                    return Err(RuntimeError::InvalidJump(*t));
                }
            }
        }
        Ok(())
    }
}
