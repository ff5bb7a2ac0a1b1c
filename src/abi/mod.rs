//! ABI module: contract interface JSON, typed tokens and their byte encoding.

pub mod codec;
pub mod interface;
pub mod types;

pub use codec::{decode, encode};
pub use interface::{selector, Abi, AbiItem, Constructor, Event, Function, Param, Selector, StateMutability};
pub use types::{ParamType, Token};
