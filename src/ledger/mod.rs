pub mod block;
pub mod index;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub use block::Block;
pub use index::TxIndex;

use crate::primitives::H256;
use crate::runtime::Receipt;
use crate::utils::{DevnetError, Result};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// In-memory chain of sealed blocks plus the receipt index.
pub struct Ledger {
    blocks: BTreeMap<u64, Block>,
    index: TxIndex,
    gas_limit: u64,
}

impl Ledger {
    /// New ledger holding only the genesis block.
    pub fn new(gas_limit: u64) -> Result<Self> {
        let genesis = Block::genesis(gas_limit, now_secs())?;
        let mut blocks = BTreeMap::new();
        blocks.insert(0, genesis);
        Ok(Self { blocks, index: TxIndex::new(), gas_limit })
    }

    pub fn latest(&self) -> Result<&Block> {
        self.blocks
            .values()
            .next_back()
            .ok_or_else(|| DevnetError::StateError("ledger has no genesis block".into()))
    }

    pub fn block_number(&self) -> u64 {
        self.blocks.keys().next_back().copied().unwrap_or(0)
    }

    /// Seal `receipt`'s transaction into a new block and index the receipt.
    /// Returns the receipt with its block number filled in.
    ///
    /// Callers check `contains` before executing; the check here only keeps
    /// the index consistent.
    pub fn mine(&mut self, mut receipt: Receipt) -> Result<Receipt> {
        if self.index.contains(&receipt.transaction_hash) {
            return Err(DevnetError::TransactionError(format!(
                "transaction {} already mined",
                receipt.transaction_hash
            )));
        }
        let parent = self.latest()?;
        let number = parent.number + 1;
        let timestamp = now_secs().max(parent.timestamp);
        let block = Block::seal(
            number,
            parent.hash,
            timestamp,
            receipt.gas_used,
            self.gas_limit,
            vec![receipt.transaction_hash],
        )?;
        self.blocks.insert(number, block);
        receipt.block_number = number;
        self.index.add(receipt.clone());
        Ok(receipt)
    }

    pub fn get_block(&self, number: u64) -> Option<&Block> {
        self.blocks.get(&number)
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.index.contains(hash)
    }

    pub fn receipt(&self, hash: &H256) -> Option<&Receipt> {
        self.index.receipt(hash)
    }

    pub fn transaction_count(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Address;

    fn receipt(tag: u8) -> Receipt {
        Receipt {
            transaction_hash: H256([tag; 32]),
            block_number: 0,
            from: Address([1; 20]),
            to: None,
            contract_address: None,
            gas_used: 21_000,
            status: true,
            logs: vec![],
            error: None,
        }
    }

    #[test]
    fn test_mine_links_blocks() {
        let mut ledger = Ledger::new(6_721_975).unwrap();
        assert_eq!(ledger.block_number(), 0);

        let r1 = ledger.mine(receipt(1)).unwrap();
        let r2 = ledger.mine(receipt(2)).unwrap();
        assert_eq!(r1.block_number, 1);
        assert_eq!(r2.block_number, 2);

        let b1 = ledger.get_block(1).unwrap().clone();
        let b2 = ledger.get_block(2).unwrap();
        assert_eq!(b2.parent_hash, b1.hash);
        assert_eq!(b1.parent_hash, ledger.get_block(0).unwrap().hash);
        assert_eq!(b2.transactions, vec![H256([2; 32])]);
        assert_eq!(ledger.receipt(&H256([1; 32])).unwrap().block_number, 1);
        assert_eq!(ledger.transaction_count(), 2);
    }

    #[test]
    fn test_duplicate_mine_rejected() {
        let mut ledger = Ledger::new(1_000_000).unwrap();
        ledger.mine(receipt(1)).unwrap();
        assert!(ledger.mine(receipt(1)).is_err());
        assert_eq!(ledger.block_number(), 1);
    }

    #[test]
    fn test_block_json_quantities() {
        let ledger = Ledger::new(6_721_975).unwrap();
        let v = serde_json::to_value(ledger.latest().unwrap()).unwrap();
        assert_eq!(v["number"], "0x0");
        assert_eq!(v["gasLimit"], "0x6691b7");
        assert!(v["parentHash"].as_str().unwrap().starts_with("0x"));
    }
}
