//! Request shapes accepted by the devnet (and by `eth_sendTransaction` / `eth_call`).

use serde::{Deserialize, Serialize};

use crate::primitives::{Address, Wei};
use crate::utils::serde_helpers::{opt_hex, opt_quantity};

/// Transaction to be signed by the node on behalf of an unlocked account.
/// Unset fields take the devnet defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRequest {
    pub from: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Wei>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Wei>,
    #[serde(default, with = "opt_hex", skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

/// Read-only call against current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(default, with = "opt_quantity", skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Wei>,
    #[serde(default, with = "opt_hex", skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
}
