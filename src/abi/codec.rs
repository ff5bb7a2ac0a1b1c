//! Token encoding.
//!
//! Every token is self-describing: a one-byte tag followed by its payload.
//!
//! | tag  | type    | payload                     |
//! |------|---------|-----------------------------|
//! | 0x01 | string  | u32 BE length + UTF-8 bytes |
//! | 0x02 | uint256 | 16 bytes BE (u128)          |
//! | 0x03 | address | 20 bytes                    |
//! | 0x04 | bool    | 1 byte, 0 or 1              |
//!
//! The VM relies on the tag to split calldata into raw argument words without
//! knowing the function signature.

use crate::abi::types::{ParamType, Token};
use crate::primitives::Address;
use crate::utils::{DevnetError, Result};

const TAG_STRING: u8 = 0x01;
const TAG_UINT: u8 = 0x02;
const TAG_ADDRESS: u8 = 0x03;
const TAG_BOOL: u8 = 0x04;

/// Upper bound on a single string payload.
pub const MAX_STRING_LEN: usize = 64 * 1024;

fn err(msg: impl Into<String>) -> DevnetError {
    DevnetError::AbiError(msg.into())
}

/// Strings longer than [`MAX_STRING_LEN`] encode but will not decode;
/// `Function::encode_input` rejects them up front.
pub fn encode_token(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::String(s) => {
            out.push(TAG_STRING);
            out.extend_from_slice(&(s.len() as u32).to_be_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Token::Uint(v) => {
            out.push(TAG_UINT);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Token::Address(a) => {
            out.push(TAG_ADDRESS);
            out.extend_from_slice(a.as_bytes());
        }
        Token::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
    }
}

pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for t in tokens {
        encode_token(t, &mut out);
    }
    out
}

/// Length in bytes of the token starting at `data[0]`.
fn token_len(data: &[u8]) -> Result<usize> {
    let tag = *data.first().ok_or_else(|| err("unexpected end of input"))?;
    let len = match tag {
        TAG_STRING => {
            let hdr = data.get(1..5).ok_or_else(|| err("truncated string length"))?;
            let n = u32::from_be_bytes([hdr[0], hdr[1], hdr[2], hdr[3]]) as usize;
            if n > MAX_STRING_LEN {
                return Err(err(format!("string of {} bytes exceeds limit", n)));
            }
            5 + n
        }
        TAG_UINT => 17,
        TAG_ADDRESS => 21,
        TAG_BOOL => 2,
        other => return Err(err(format!("unknown token tag 0x{:02x}", other))),
    };
    if data.len() < len {
        return Err(err("truncated token"));
    }
    Ok(len)
}

/// Split an encoded sequence into raw per-token slices.
pub fn split(mut data: &[u8]) -> Result<Vec<&[u8]>> {
    let mut out = Vec::new();
    while !data.is_empty() {
        let n = token_len(data)?;
        out.push(&data[..n]);
        data = &data[n..];
    }
    Ok(out)
}

/// Decode a single raw token slice as produced by [`split`].
pub fn decode_token(raw: &[u8]) -> Result<Token> {
    let payload = &raw[1..];
    match raw[0] {
        TAG_STRING => {
            let s = std::str::from_utf8(&payload[4..]).map_err(|e| err(format!("invalid utf-8: {}", e)))?;
            Ok(Token::String(s.to_string()))
        }
        TAG_UINT => {
            let mut b = [0u8; 16];
            b.copy_from_slice(payload);
            Ok(Token::Uint(u128::from_be_bytes(b)))
        }
        TAG_ADDRESS => Ok(Token::Address(Address::from_slice(payload)?)),
        TAG_BOOL => match payload[0] {
            0 => Ok(Token::Bool(false)),
            1 => Ok(Token::Bool(true)),
            b => Err(err(format!("invalid bool byte {}", b))),
        },
        other => Err(err(format!("unknown token tag 0x{:02x}", other))),
    }
}

/// Decode `data` against the expected types. Type mismatches, truncation and
/// trailing bytes are errors.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    let raws = split(data)?;
    if raws.len() != types.len() {
        return Err(err(format!("expected {} values, found {}", types.len(), raws.len())));
    }
    let mut out = Vec::with_capacity(types.len());
    for (ty, raw) in types.iter().zip(raws) {
        let tok = decode_token(raw)?;
        if tok.param_type() != *ty {
            return Err(err(format!("expected {}, found {}", ty, tok.param_type())));
        }
        out.push(tok);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_tokens() {
        let tokens = vec![
            Token::from("Hi there!"),
            Token::Uint(42),
            Token::Address(Address([7u8; 20])),
            Token::Bool(true),
        ];
        let bytes = encode(&tokens);
        let types = [ParamType::String, ParamType::Uint, ParamType::Address, ParamType::Bool];
        assert_eq!(decode(&types, &bytes).unwrap(), tokens);
        assert_eq!(split(&bytes).unwrap().len(), 4);
    }

    #[test]
    fn test_type_mismatch() {
        let bytes = encode(&[Token::Uint(1)]);
        assert!(decode(&[ParamType::String], &bytes).is_err());
    }

    #[test]
    fn test_truncated_and_trailing() {
        let mut bytes = encode(&[Token::from("hello")]);
        assert!(decode(&[ParamType::String], &bytes[..bytes.len() - 1]).is_err());
        bytes.push(0x04);
        assert!(decode(&[ParamType::String], &bytes).is_err());
    }

    #[test]
    fn test_empty_string() {
        let bytes = encode(&[Token::from("")]);
        assert_eq!(bytes, vec![TAG_STRING, 0, 0, 0, 0]);
        assert_eq!(decode(&[ParamType::String], &bytes).unwrap(), vec![Token::from("")]);
    }

    #[test]
    fn test_invalid_bool() {
        assert!(decode(&[ParamType::Bool], &[TAG_BOOL, 2]).is_err());
    }
}
