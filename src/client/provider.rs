//! Transports the client talks through: the devnet in-process, or its JSON-RPC
//! endpoint over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};

use crate::node::{CallArgs, Devnet, TxRequest};
use crate::primitives::{Address, Wei, H256};
use crate::rpc::EthApiClient;
use crate::runtime::Receipt;
use crate::utils::{DevnetError, Result};

#[async_trait]
pub trait Provider: Send + Sync {
    async fn accounts(&self) -> Result<Vec<Address>>;
    async fn get_balance(&self, address: Address) -> Result<Wei>;
    async fn get_code(&self, address: Address) -> Result<Vec<u8>>;
    async fn send_transaction(&self, request: TxRequest) -> Result<H256>;
    async fn call(&self, args: CallArgs) -> Result<Vec<u8>>;
    async fn receipt(&self, hash: H256) -> Result<Option<Receipt>>;
}

/// Direct access to a devnet in the same process.
#[derive(Clone)]
pub struct LocalProvider {
    devnet: Arc<Devnet>,
}

impl LocalProvider {
    pub fn new(devnet: Arc<Devnet>) -> Self {
        Self { devnet }
    }
}

#[async_trait]
impl Provider for LocalProvider {
    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.devnet.accounts())
    }

    async fn get_balance(&self, address: Address) -> Result<Wei> {
        self.devnet.balance(&address)
    }

    async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        self.devnet.code(&address)
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<H256> {
        self.devnet.send_transaction(request).await
    }

    async fn call(&self, args: CallArgs) -> Result<Vec<u8>> {
        self.devnet.call(args)
    }

    async fn receipt(&self, hash: H256) -> Result<Option<Receipt>> {
        Ok(self.devnet.receipt(&hash))
    }
}

/// JSON-RPC over HTTP.
pub struct HttpProvider {
    client: HttpClient,
}

fn rpc_err(e: jsonrpsee::core::ClientError) -> DevnetError {
    DevnetError::RpcError(e.to_string())
}

impl HttpProvider {
    pub fn new(url: &str) -> Result<Self> {
        let client = HttpClientBuilder::default().build(url).map_err(rpc_err)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn accounts(&self) -> Result<Vec<Address>> {
        EthApiClient::accounts(&self.client).await.map_err(rpc_err)
    }

    async fn get_balance(&self, address: Address) -> Result<Wei> {
        EthApiClient::get_balance(&self.client, address, None).await.map_err(rpc_err)
    }

    async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        let code = EthApiClient::get_code(&self.client, address, None).await.map_err(rpc_err)?;
        Ok(code.0)
    }

    async fn send_transaction(&self, request: TxRequest) -> Result<H256> {
        EthApiClient::send_transaction(&self.client, request).await.map_err(rpc_err)
    }

    async fn call(&self, args: CallArgs) -> Result<Vec<u8>> {
        let out = EthApiClient::call(&self.client, args, None).await.map_err(rpc_err)?;
        Ok(out.0)
    }

    async fn receipt(&self, hash: H256) -> Result<Option<Receipt>> {
        EthApiClient::get_transaction_receipt(&self.client, hash).await.map_err(rpc_err)
    }
}
