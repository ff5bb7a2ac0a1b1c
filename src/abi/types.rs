use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitives::Address;

/// Parameter types understood by devnet contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "uint256")]
    Uint,
    #[serde(rename = "address")]
    Address,
    #[serde(rename = "bool")]
    Bool,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamType::String => "string",
            ParamType::Uint => "uint256",
            ParamType::Address => "address",
            ParamType::Bool => "bool",
        };
        f.write_str(s)
    }
}

/// A typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    String(String),
    Uint(u128),
    Address(Address),
    Bool(bool),
}

impl Token {
    pub fn param_type(&self) -> ParamType {
        match self {
            Token::String(_) => ParamType::String,
            Token::Uint(_) => ParamType::Uint,
            Token::Address(_) => ParamType::Address,
            Token::Bool(_) => ParamType::Bool,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::String(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::String(s)
    }
}

impl From<Address> for Token {
    fn from(a: Address) -> Self {
        Token::Address(a)
    }
}

impl From<bool> for Token {
    fn from(b: bool) -> Self {
        Token::Bool(b)
    }
}

impl From<u128> for Token {
    fn from(v: u128) -> Self {
        Token::Uint(v)
    }
}
