use std::sync::Arc;

use crate::abi::Abi;
use crate::client::contract::Contract;
use crate::client::provider::Provider;
use crate::node::{CallArgs, TxRequest};
use crate::primitives::{Address, Wei, H256};
use crate::runtime::Receipt;
use crate::utils::{DevnetError, Result};

/// Entry point of the client library.
#[derive(Clone)]
pub struct Web3 {
    eth: Eth,
}

impl Web3 {
    pub fn new<P: Provider + 'static>(provider: P) -> Self {
        Self { eth: Eth { provider: Arc::new(provider) } }
    }

    pub fn eth(&self) -> &Eth {
        &self.eth
    }
}

/// Chain queries and transaction submission.
#[derive(Clone)]
pub struct Eth {
    provider: Arc<dyn Provider>,
}

impl Eth {
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.provider.accounts().await
    }

    pub async fn get_balance(&self, address: Address) -> Result<Wei> {
        self.provider.get_balance(address).await
    }

    pub async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        self.provider.get_code(address).await
    }

    pub async fn send_transaction(&self, request: TxRequest) -> Result<H256> {
        self.provider.send_transaction(request).await
    }

    pub async fn call(&self, args: CallArgs) -> Result<Vec<u8>> {
        self.provider.call(args).await
    }

    pub async fn get_transaction_receipt(&self, hash: H256) -> Result<Option<Receipt>> {
        self.provider.receipt(hash).await
    }

    /// Send and return the mined receipt. A reverted transaction is an error.
    pub async fn send_and_confirm(&self, request: TxRequest) -> Result<Receipt> {
        let hash = self.send_transaction(request).await?;
        let receipt = self
            .get_transaction_receipt(hash)
            .await?
            .ok_or(DevnetError::UnknownTransaction(hash))?;
        if !receipt.status {
            return Err(DevnetError::TransactionFailed {
                hash,
                reason: receipt.error.clone().unwrap_or_else(|| "reverted".into()),
            });
        }
        Ok(receipt)
    }

    /// Contract handle with no address yet; see [`Contract::deploy`].
    pub fn contract(&self, abi: Abi) -> Contract {
        Contract::new(self.clone(), abi)
    }
}
