//! Message box suite: a fresh devnet and a fresh deployment before every test.

use std::sync::Arc;

use jsonrpsee::http_client::HttpClientBuilder;

use crate::abi::{Abi, Token};
use crate::client::{Contract, DeployOptions, HttpProvider, LocalProvider, SendOptions, Web3};
use crate::contracts::inbox::{self, INITIAL_STRING, SET_MESSAGE};
use crate::crypto::Keypair;
use crate::node::{Devnet, DevnetConfig};
use crate::primitives::{Address, Bytes, Quantity, Wei};
use crate::rpc::{DevnetApiClient, EthApiClient, RpcServer};
use crate::runtime::Transaction;
use crate::utils::DevnetError;

const DEPLOY_GAS: u64 = 1_000_000;

struct Fixture {
    web3: Web3,
    accounts: Vec<Address>,
    inbox: Contract,
}

async fn deploy(web3: Web3) -> Fixture {
    let accounts = web3.eth().accounts().await.unwrap();
    let compiled = inbox::compile().unwrap();
    let factory = web3.eth().contract(Abi::from_json(&compiled.interface).unwrap());
    let inbox = factory
        .deploy(DeployOptions { data: compiled.bytecode, arguments: vec![INITIAL_STRING.into()] })
        .unwrap()
        .send(SendOptions::new(accounts[0]).gas(DEPLOY_GAS))
        .await
        .unwrap();
    Fixture { web3, accounts, inbox }
}

async fn local() -> Fixture {
    let devnet = Devnet::shared(DevnetConfig::default()).unwrap();
    deploy(Web3::new(LocalProvider::new(devnet))).await
}

async fn message(inbox: &Contract) -> String {
    let out = inbox.method("message", vec![]).unwrap().call().await.unwrap();
    assert_eq!(out.len(), 1);
    out[0].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_deploys_a_contract() {
    let f = local().await;
    assert_eq!(f.accounts.len(), 10);
    let address = f.inbox.options.address.unwrap();
    assert!(!f.web3.eth().get_code(address).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_has_a_default_message() {
    let f = local().await;
    assert_eq!(message(&f.inbox).await, INITIAL_STRING);
}

#[tokio::test]
async fn test_can_change_the_message() {
    let f = local().await;
    let receipt = f
        .inbox
        .method("setMessage", vec![SET_MESSAGE.into()])
        .unwrap()
        .send(SendOptions::new(f.accounts[0]))
        .await
        .unwrap();
    assert!(receipt.status);
    assert_eq!(receipt.logs.len(), 1);
    assert_eq!(message(&f.inbox).await, SET_MESSAGE);
}

#[tokio::test]
async fn test_each_deployment_starts_fresh() {
    let first = local().await;
    first
        .inbox
        .method("setMessage", vec![SET_MESSAGE.into()])
        .unwrap()
        .send(SendOptions::new(first.accounts[0]))
        .await
        .unwrap();

    let second = local().await;
    assert_eq!(first.accounts, second.accounts);
    assert_eq!(first.inbox.options.address, second.inbox.options.address);
    assert_eq!(message(&second.inbox).await, INITIAL_STRING);
}

#[tokio::test]
async fn test_deployer_pays_for_gas() {
    let f = local().await;
    let balance = f.web3.eth().get_balance(f.accounts[0]).await.unwrap();
    assert!(balance < Wei::ether(100));
    assert_eq!(f.web3.eth().get_balance(f.accounts[1]).await.unwrap(), Wei::ether(100));
}

#[tokio::test]
async fn test_deploy_below_intrinsic_gas_is_rejected() {
    let f = local().await;
    let compiled = inbox::compile().unwrap();
    let res = f
        .inbox
        .deploy(DeployOptions { data: compiled.bytecode, arguments: vec![INITIAL_STRING.into()] })
        .unwrap()
        .send(SendOptions::new(f.accounts[1]).gas(53_000))
        .await;
    assert!(matches!(res, Err(DevnetError::TransactionError(_))));
}

#[tokio::test]
async fn test_bad_arguments_fail_before_sending() {
    let f = local().await;
    let balance_after_deploy = f.web3.eth().get_balance(f.accounts[0]).await.unwrap();
    assert!(matches!(f.inbox.method("nope", vec![]), Err(DevnetError::AbiError(_))));
    assert!(matches!(f.inbox.method("setMessage", vec![]), Err(DevnetError::AbiError(_))));
    assert!(matches!(
        f.inbox.method("setMessage", vec![Token::Uint(1)]),
        Err(DevnetError::AbiError(_))
    ));
    assert!(f.inbox.deploy(DeployOptions::default()).is_err());

    let oversized = "a".repeat(crate::abi::codec::MAX_STRING_LEN + 1);
    assert!(matches!(
        f.inbox.method("setMessage", vec![oversized.as_str().into()]),
        Err(DevnetError::AbiError(_))
    ));
    assert_eq!(f.web3.eth().get_balance(f.accounts[0]).await.unwrap(), balance_after_deploy);
    assert_eq!(message(&f.inbox).await, INITIAL_STRING);
}

#[tokio::test]
async fn test_deploy_data_is_bytecode_then_arguments() {
    let f = local().await;
    assert!(f.inbox.abi().function("message").unwrap().is_constant());
    assert!(!f.inbox.abi().function("setMessage").unwrap().is_constant());

    let compiled = inbox::compile().unwrap();
    let deployer = f
        .inbox
        .deploy(DeployOptions { data: compiled.bytecode.clone(), arguments: vec![SET_MESSAGE.into()] })
        .unwrap();
    let (code, args) = deployer.data().split_at(compiled.bytecode.len());
    assert_eq!(code, compiled.bytecode.as_slice());
    assert_eq!(args, crate::abi::encode(&[SET_MESSAGE.into()]).as_slice());

    let second = deployer.send(SendOptions::new(f.accounts[1]).gas(DEPLOY_GAS)).await.unwrap();
    assert_ne!(second.options.address, f.inbox.options.address);
    assert_eq!(message(&second).await, SET_MESSAGE);
}

#[tokio::test]
async fn test_paying_set_message_reverts() {
    let f = local().await;
    let res = f
        .inbox
        .method("setMessage", vec![SET_MESSAGE.into()])
        .unwrap()
        .send(SendOptions::new(f.accounts[0]).value(Wei(1)))
        .await;
    match res {
        Err(DevnetError::TransactionFailed { reason, .. }) => assert!(reason.contains("not payable")),
        other => panic!("expected revert, got {:?}", other.map(|r| r.status)),
    }
    assert_eq!(message(&f.inbox).await, INITIAL_STRING);
}

#[tokio::test]
async fn test_calling_a_setter_does_not_write() {
    let f = local().await;
    let res = f.inbox.method("setMessage", vec![SET_MESSAGE.into()]).unwrap().call().await;
    assert!(res.is_err());
    assert_eq!(message(&f.inbox).await, INITIAL_STRING);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_suite_over_json_rpc() {
    let devnet = Devnet::shared(DevnetConfig::default()).unwrap();
    let (addr, svc) = RpcServer::new("127.0.0.1:0", Arc::clone(&devnet)).start().await.unwrap();
    let url = format!("http://{}", addr);

    let f = deploy(Web3::new(HttpProvider::new(&url).unwrap())).await;
    let contract = f.inbox.options.address.unwrap();
    assert_eq!(message(&f.inbox).await, INITIAL_STRING);

    let receipt = f
        .inbox
        .method("setMessage", vec![SET_MESSAGE.into()])
        .unwrap()
        .send(SendOptions::new(f.accounts[0]))
        .await
        .unwrap();
    assert_eq!(message(&f.inbox).await, SET_MESSAGE);

    // the remaining eth_ and devnet_ methods, straight through the client traits
    let rpc = HttpClientBuilder::default().build(&url).unwrap();
    assert_eq!(EthApiClient::block_number(&rpc).await.unwrap(), Quantity(2));
    assert_eq!(EthApiClient::get_transaction_count(&rpc, f.accounts[0], None).await.unwrap(), Quantity(2));
    assert_eq!(
        EthApiClient::get_code(&rpc, contract, Some("latest".into())).await.unwrap().0,
        devnet.code(&contract).unwrap()
    );
    assert!(EthApiClient::get_code(&rpc, f.accounts[1], None).await.unwrap().0.is_empty());

    let block = EthApiClient::get_block_by_number(&rpc, Quantity(2)).await.unwrap().unwrap();
    assert_eq!(block.number, 2);
    assert_eq!(block.transactions, vec![receipt.transaction_hash]);
    assert!(EthApiClient::get_block_by_number(&rpc, Quantity(99)).await.unwrap().is_none());

    let signer = Keypair::derive(&devnet.config().seed, 1);
    let raw = Transaction {
        from: f.accounts[1],
        to: Some(f.accounts[2]),
        value: Wei::ether(1),
        gas: 21_000,
        gas_price: devnet.config().gas_price(),
        nonce: 0,
        data: vec![],
    }
    .sign(&signer)
    .unwrap()
    .encode()
    .unwrap();
    let hash = EthApiClient::send_raw_transaction(&rpc, Bytes(raw)).await.unwrap();
    let mined = EthApiClient::get_transaction_receipt(&rpc, hash).await.unwrap().unwrap();
    assert!(mined.status);
    assert_eq!(mined.block_number, 3);
    assert_eq!(f.web3.eth().get_balance(f.accounts[2]).await.unwrap(), Wei::ether(101));
    assert!(EthApiClient::send_raw_transaction(&rpc, Bytes(vec![0xff; 8])).await.is_err());

    let metrics = DevnetApiClient::metrics(&rpc).await.unwrap();
    assert!(metrics.get(crate::utils::metrics::TX_MINED).copied().unwrap_or(0) >= 3);
    assert!(metrics.get(crate::utils::metrics::CONTRACTS_DEPLOYED).copied().unwrap_or(0) >= 1);

    svc.shutdown().await.unwrap();
}
