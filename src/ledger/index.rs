use std::collections::HashMap;

use crate::primitives::H256;
use crate::runtime::Receipt;

/// Transaction hash -> receipt (which carries its block number).
#[derive(Default)]
pub struct TxIndex {
    receipts: HashMap<H256, Receipt>,
}

impl TxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, receipt: Receipt) {
        self.receipts.insert(receipt.transaction_hash, receipt);
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.receipts.contains_key(hash)
    }

    pub fn receipt(&self, hash: &H256) -> Option<&Receipt> {
        self.receipts.get(hash)
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}
