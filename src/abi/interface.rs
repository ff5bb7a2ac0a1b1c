//! Contract interface description (the JSON "ABI").

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::abi::codec;
use crate::abi::types::{ParamType, Token};
use crate::utils::{DevnetError, Result};

pub type Selector = [u8; 4];

/// First 4 bytes of sha256 over a canonical signature like `setMessage(string)`.
pub fn selector(signature: &str) -> Selector {
    let h = Sha256::digest(signature.as_bytes());
    [h[0], h[1], h[2], h[3]]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
}

impl Param {
    pub fn new(name: &str, kind: ParamType) -> Self {
        Self { name: name.to_string(), kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    View,
    Nonpayable,
    Payable,
}

fn check_args(what: &str, inputs: &[Param], args: &[Token]) -> Result<()> {
    if inputs.len() != args.len() {
        return Err(DevnetError::AbiError(format!(
            "{} expects {} argument(s), got {}",
            what,
            inputs.len(),
            args.len()
        )));
    }
    for (p, a) in inputs.iter().zip(args) {
        if let Token::String(s) = a {
            if s.len() > codec::MAX_STRING_LEN {
                return Err(DevnetError::AbiError(format!(
                    "{}: argument {:?} is {} bytes, limit is {}",
                    what,
                    p.name,
                    s.len(),
                    codec::MAX_STRING_LEN
                )));
            }
        }
        if p.kind != a.param_type() {
            return Err(DevnetError::AbiError(format!(
                "{}: argument {:?} expects {}, got {}",
                what,
                p.name,
                p.kind,
                a.param_type()
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub outputs: Vec<Param>,
    #[serde(rename = "stateMutability")]
    pub state_mutability: StateMutability,
}

impl Function {
    pub fn signature(&self) -> String {
        let args: Vec<String> = self.inputs.iter().map(|p| p.kind.to_string()).collect();
        format!("{}({})", self.name, args.join(","))
    }

    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }

    pub fn is_constant(&self) -> bool {
        self.state_mutability == StateMutability::View
    }

    /// Calldata: selector followed by the encoded, type-checked arguments.
    pub fn encode_input(&self, args: &[Token]) -> Result<Vec<u8>> {
        check_args(&self.name, &self.inputs, args)?;
        let mut out = self.selector().to_vec();
        out.extend(codec::encode(args));
        Ok(out)
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>> {
        let types: Vec<ParamType> = self.outputs.iter().map(|p| p.kind).collect();
        codec::decode(&types, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    #[serde(rename = "stateMutability")]
    pub state_mutability: StateMutability,
}

impl Constructor {
    pub fn encode_input(&self, args: &[Token]) -> Result<Vec<u8>> {
        check_args("constructor", &self.inputs, args)?;
        Ok(codec::encode(args))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
}

impl Event {
    pub fn topic(&self) -> Selector {
        let args: Vec<String> = self.inputs.iter().map(|p| p.kind.to_string()).collect();
        selector(&format!("{}({})", self.name, args.join(",")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    Constructor(Constructor),
    Function(Function),
    Event(Event),
}

/// A parsed contract interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Abi {
    pub items: Vec<AbiItem>,
}

impl Abi {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| DevnetError::AbiError(format!("invalid interface json: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| DevnetError::AbiError(e.to_string()))
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.items.iter().find_map(|i| match i {
            AbiItem::Constructor(c) => Some(c),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|i| match i {
            AbiItem::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Result<&Function> {
        self.functions()
            .find(|f| f.name == name)
            .ok_or_else(|| DevnetError::AbiError(format!("no function named {:?} in interface", name)))
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.items.iter().filter_map(|i| match i {
            AbiItem::Event(e) => Some(e),
            _ => None,
        })
    }
}
