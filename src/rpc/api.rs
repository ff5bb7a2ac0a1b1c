//! JSON-RPC method definitions. The macro generates both the server traits
//! implemented in `server.rs` and the `*Client` traits the HTTP provider uses.

use std::collections::BTreeMap;

use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::ledger::Block;
use crate::node::request::{CallArgs, TxRequest};
use crate::primitives::{Address, Bytes, Quantity, Wei, H256};
use crate::runtime::Receipt;

/// Block tag parameter. Only the latest state exists, so any tag is accepted
/// and ignored.
pub type BlockTag = Option<String>;

#[rpc(server, client, namespace = "eth")]
pub trait EthApi {
    #[method(name = "accounts")]
    async fn accounts(&self) -> RpcResult<Vec<Address>>;

    #[method(name = "blockNumber")]
    async fn block_number(&self) -> RpcResult<Quantity>;

    #[method(name = "getBalance")]
    async fn get_balance(&self, address: Address, block: BlockTag) -> RpcResult<Wei>;

    #[method(name = "getTransactionCount")]
    async fn get_transaction_count(&self, address: Address, block: BlockTag) -> RpcResult<Quantity>;

    #[method(name = "getCode")]
    async fn get_code(&self, address: Address, block: BlockTag) -> RpcResult<Bytes>;

    #[method(name = "sendTransaction")]
    async fn send_transaction(&self, request: TxRequest) -> RpcResult<H256>;

    /// `raw` is a bincode-encoded `SignedTransaction` (see `SignedTransaction::encode`).
    #[method(name = "sendRawTransaction")]
    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<H256>;

    #[method(name = "call")]
    async fn call(&self, args: CallArgs, block: BlockTag) -> RpcResult<Bytes>;

    #[method(name = "getTransactionReceipt")]
    async fn get_transaction_receipt(&self, hash: H256) -> RpcResult<Option<Receipt>>;

    #[method(name = "getBlockByNumber")]
    async fn get_block_by_number(&self, number: Quantity) -> RpcResult<Option<Block>>;
}

#[rpc(server, client, namespace = "devnet")]
pub trait DevnetApi {
    #[method(name = "metrics")]
    async fn metrics(&self) -> RpcResult<BTreeMap<String, u64>>;
}
