use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use jsonrpsee::core::RpcResult;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use tracing::{debug, info};

use crate::ledger::Block;
use crate::node::request::{CallArgs, TxRequest};
use crate::node::{Devnet, ServiceHandle};
use crate::primitives::{Address, Bytes, Quantity, Wei, H256};
use crate::rpc::api::{BlockTag, DevnetApiServer, EthApiServer};
use crate::runtime::{Receipt, SignedTransaction};
use crate::utils::{DevnetError, Result};

pub const INVALID_PARAMS: i32 = -32602;
pub const EXECUTION_ERROR: i32 = -32000;

/// Map a domain error onto a JSON-RPC error object.
pub fn to_rpc_error(e: DevnetError) -> ErrorObjectOwned {
    let code = match e {
        DevnetError::UnknownAccount(_) | DevnetError::AbiError(_) | DevnetError::ConfigError(_) => INVALID_PARAMS,
        _ => EXECUTION_ERROR,
    };
    ErrorObjectOwned::owned(code, e.to_string(), None::<()>)
}

/// `eth_` and `devnet_` handlers over a shared devnet.
#[derive(Clone)]
pub struct DevnetRpc {
    devnet: Arc<Devnet>,
}

impl DevnetRpc {
    pub fn new(devnet: Arc<Devnet>) -> Self {
        Self { devnet }
    }
}

#[async_trait]
impl EthApiServer for DevnetRpc {
    async fn accounts(&self) -> RpcResult<Vec<Address>> {
        Ok(self.devnet.accounts())
    }

    async fn block_number(&self) -> RpcResult<Quantity> {
        Ok(Quantity(self.devnet.block_number()))
    }

    async fn get_balance(&self, address: Address, _block: BlockTag) -> RpcResult<Wei> {
        self.devnet.balance(&address).map_err(to_rpc_error)
    }

    async fn get_transaction_count(&self, address: Address, _block: BlockTag) -> RpcResult<Quantity> {
        self.devnet.nonce(&address).map(Quantity).map_err(to_rpc_error)
    }

    async fn get_code(&self, address: Address, _block: BlockTag) -> RpcResult<Bytes> {
        self.devnet.code(&address).map(Bytes).map_err(to_rpc_error)
    }

    async fn send_transaction(&self, request: TxRequest) -> RpcResult<H256> {
        debug!(from = %request.from, "eth_sendTransaction");
        self.devnet.send_transaction(request).await.map_err(to_rpc_error)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<H256> {
        let tx = SignedTransaction::decode(&raw.0).map_err(to_rpc_error)?;
        debug!(from = %tx.tx.from, "eth_sendRawTransaction");
        self.devnet.send_signed_transaction(tx).await.map_err(to_rpc_error)
    }

    async fn call(&self, args: CallArgs, _block: BlockTag) -> RpcResult<Bytes> {
        self.devnet.call(args).map(Bytes).map_err(to_rpc_error)
    }

    async fn get_transaction_receipt(&self, hash: H256) -> RpcResult<Option<Receipt>> {
        Ok(self.devnet.receipt(&hash))
    }

    async fn get_block_by_number(&self, number: Quantity) -> RpcResult<Option<Block>> {
        Ok(self.devnet.block(number.0))
    }
}

#[async_trait]
impl DevnetApiServer for DevnetRpc {
    async fn metrics(&self) -> RpcResult<BTreeMap<String, u64>> {
        Ok(self.devnet.metrics())
    }
}

/// RpcServer binds the JSON-RPC HTTP endpoint for a devnet.
pub struct RpcServer {
    addr: String,
    devnet: Arc<Devnet>,
}

impl RpcServer {
    pub fn new(addr: impl Into<String>, devnet: Arc<Devnet>) -> Self {
        Self { addr: addr.into(), devnet }
    }

    /// Bind and serve. Returns the bound address and a handle whose
    /// `shutdown()` stops the server.
    pub async fn start(self) -> Result<(SocketAddr, ServiceHandle)> {
        let server = Server::builder()
            .build(self.addr.as_str())
            .await
            .map_err(|e| DevnetError::RpcError(format!("bind {}: {}", self.addr, e)))?;
        let local = server
            .local_addr()
            .map_err(|e| DevnetError::RpcError(e.to_string()))?;

        let rpc = DevnetRpc::new(self.devnet);
        let mut module = EthApiServer::into_rpc(rpc.clone());
        module
            .merge(DevnetApiServer::into_rpc(rpc))
            .map_err(|e| DevnetError::RpcError(e.to_string()))?;

        let handle = server.start(module);
        info!("JSON-RPC server listening on {}", local);

        let (mut svc, mut shutdown_rx) = ServiceHandle::new();
        svc.attach(tokio::spawn(async move {
            while !*shutdown_rx.borrow() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
            // already stopped is fine
            let _ = handle.stop();
            handle.stopped().await;
            info!("JSON-RPC server stopped");
            Ok(())
        }));

        Ok((local, svc))
    }
}
