use serde::{Deserialize, Serialize};

use crate::primitives::H256;
use crate::utils::serde_helpers::quantity;
use crate::utils::{DevnetError, Result};

/// A sealed block. With instant mining every non-genesis block holds exactly
/// one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(with = "quantity")]
    pub number: u64,
    pub hash: H256,
    pub parent_hash: H256,
    #[serde(with = "quantity")]
    pub timestamp: u64,
    #[serde(with = "quantity")]
    pub gas_used: u64,
    #[serde(with = "quantity")]
    pub gas_limit: u64,
    pub transactions: Vec<H256>,
}

#[derive(Serialize)]
struct HeaderPreimage<'a> {
    number: u64,
    parent_hash: &'a H256,
    timestamp: u64,
    gas_used: u64,
    gas_limit: u64,
    transactions: &'a [H256],
}

impl Block {
    pub fn genesis(gas_limit: u64, timestamp: u64) -> Result<Self> {
        Self::seal(0, H256::ZERO, timestamp, 0, gas_limit, Vec::new())
    }

    /// Build a block and compute its hash over the header fields.
    pub fn seal(
        number: u64,
        parent_hash: H256,
        timestamp: u64,
        gas_used: u64,
        gas_limit: u64,
        transactions: Vec<H256>,
    ) -> Result<Self> {
        let preimage = HeaderPreimage {
            number,
            parent_hash: &parent_hash,
            timestamp,
            gas_used,
            gas_limit,
            transactions: &transactions,
        };
        let bin = bincode::serialize(&preimage).map_err(|e| DevnetError::StateError(e.to_string()))?;
        Ok(Self {
            number,
            hash: H256::digest(&bin),
            parent_hash,
            timestamp,
            gas_used,
            gas_limit,
            transactions,
        })
    }
}
