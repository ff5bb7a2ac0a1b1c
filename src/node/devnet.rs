//! The in-memory development chain.
//!
//! Holds unlocked dev accounts, executes every accepted transaction right
//! away and seals it into its own block.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as TokioMutex;
use tracing::info;

use crate::crypto::Keypair;
use crate::ledger::{Block, Ledger};
use crate::node::config::DevnetConfig;
use crate::node::request::{CallArgs, TxRequest};
use crate::primitives::{Address, Wei, H256};
use crate::runtime::{CallRequest, Executor, ExecutorConfig, Receipt, SignedTransaction, Transaction};
use crate::state::{Account, AccountCache, AccountLocks, AccountStore, InMemAccountStore};
use crate::utils::{DevnetError, Result, METRICS};

pub struct Devnet {
    cfg: DevnetConfig,
    /// unlocked accounts in creation order
    accounts: Vec<Address>,
    keys: HashMap<Address, Keypair>,
    executor: Executor,
    ledger: RwLock<Ledger>,
    /// execute + mine must happen as one step so block order matches execution order
    mining: TokioMutex<()>,
}

impl Devnet {
    pub fn new(cfg: DevnetConfig) -> Result<Self> {
        cfg.validate()?;

        let store = Arc::new(InMemAccountStore::new()) as Arc<dyn AccountStore>;
        let cache = AccountCache::new(store);

        let mut accounts = Vec::with_capacity(cfg.accounts as usize);
        let mut keys = HashMap::new();
        for i in 0..cfg.accounts {
            let kp = Keypair::derive(&cfg.seed, i);
            let addr = kp.address();
            cache.insert(addr, Account::new(cfg.default_balance()))?;
            accounts.push(addr);
            keys.insert(addr, kp);
        }
        cache.flush()?;

        let executor = Executor::new(
            cache,
            AccountLocks::default(),
            ExecutorConfig { block_gas_limit: cfg.gas_limit },
        );
        let ledger = Ledger::new(cfg.gas_limit)?;

        info!(accounts = accounts.len(), balance = %cfg.default_balance(), "devnet initialized");
        Ok(Self {
            cfg,
            accounts,
            keys,
            executor,
            ledger: RwLock::new(ledger),
            mining: TokioMutex::new(()),
        })
    }

    /// Shared handle, the form every provider and the RPC server take.
    pub fn shared(cfg: DevnetConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(cfg)?))
    }

    pub fn config(&self) -> &DevnetConfig {
        &self.cfg
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }

    pub fn balance(&self, addr: &Address) -> Result<Wei> {
        Ok(self.executor.cache.get_or_default(addr)?.balance)
    }

    pub fn nonce(&self, addr: &Address) -> Result<u64> {
        Ok(self.executor.cache.get_or_default(addr)?.nonce)
    }

    pub fn code(&self, addr: &Address) -> Result<Vec<u8>> {
        Ok(self.executor.cache.get_or_default(addr)?.code)
    }

    /// Sign `req` with the held key of `req.from`, execute and mine it.
    pub async fn send_transaction(&self, req: TxRequest) -> Result<H256> {
        let kp = self.keys.get(&req.from).ok_or(DevnetError::UnknownAccount(req.from))?;

        let _mining = self.mining.lock().await;
        let nonce = match req.nonce {
            Some(n) => n,
            None => self.nonce(&req.from)?,
        };
        let tx = Transaction {
            from: req.from,
            to: req.to,
            value: req.value.unwrap_or(Wei::ZERO),
            gas: req.gas.unwrap_or(self.cfg.default_gas),
            gas_price: req.gas_price.unwrap_or_else(|| self.cfg.gas_price()),
            nonce,
            data: req.data.unwrap_or_default(),
        };
        let stx = tx.sign(kp)?;
        self.apply(&stx).await
    }

    /// Execute and mine a transaction signed elsewhere.
    pub async fn send_signed_transaction(&self, stx: SignedTransaction) -> Result<H256> {
        let _mining = self.mining.lock().await;
        self.apply(&stx).await
    }

    /// Caller holds `mining`, so nothing is mined between the duplicate check
    /// and `mine`.
    async fn apply(&self, stx: &SignedTransaction) -> Result<H256> {
        let hash = stx.hash()?;
        if self.ledger.read().contains(&hash) {
            return Err(DevnetError::TransactionError(format!("transaction {} already known", hash)));
        }
        let receipt = self.executor.execute(stx).await?;
        let receipt = self.ledger.write().mine(receipt)?;
        info!(
            hash = %receipt.transaction_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            status = receipt.status,
            "transaction mined"
        );
        Ok(receipt.transaction_hash)
    }

    pub fn call(&self, args: CallArgs) -> Result<Vec<u8>> {
        let req = CallRequest {
            from: args.from.unwrap_or(Address::ZERO),
            to: args.to,
            value: args.value.unwrap_or(Wei::ZERO),
            gas: args.gas.unwrap_or(self.cfg.gas_limit),
            data: args.data.unwrap_or_default(),
        };
        self.executor.call(&req)
    }

    pub fn receipt(&self, hash: &H256) -> Option<Receipt> {
        self.ledger.read().receipt(hash).cloned()
    }

    pub fn block(&self, number: u64) -> Option<Block> {
        self.ledger.read().get_block(number).cloned()
    }

    pub fn block_number(&self) -> u64 {
        self.ledger.read().block_number()
    }

    pub fn metrics(&self) -> BTreeMap<String, u64> {
        METRICS.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devnet() -> Devnet {
        Devnet::new(DevnetConfig { accounts: 3, ..Default::default() }).unwrap()
    }

    #[test]
    fn test_accounts_are_funded() {
        let net = devnet();
        let accounts = net.accounts();
        assert_eq!(accounts.len(), 3);
        for a in &accounts {
            assert_eq!(net.balance(a).unwrap(), Wei::ether(100));
            assert_eq!(net.nonce(a).unwrap(), 0);
        }
        assert_eq!(net.block_number(), 0);
    }

    #[test]
    fn test_accounts_are_deterministic() {
        assert_eq!(devnet().accounts(), devnet().accounts());
    }

    #[tokio::test]
    async fn test_transfer_mines_a_block() {
        let net = devnet();
        let accounts = net.accounts();
        let hash = net
            .send_transaction(TxRequest {
                from: accounts[0],
                to: Some(accounts[1]),
                value: Some(Wei::ether(1)),
                ..Default::default()
            })
            .await
            .unwrap();

        let receipt = net.receipt(&hash).unwrap();
        assert!(receipt.status);
        assert_eq!(receipt.block_number, 1);
        assert_eq!(net.block_number(), 1);
        assert_eq!(net.block(1).unwrap().transactions, vec![hash]);
        assert_eq!(net.balance(&accounts[1]).unwrap(), Wei::ether(101));

        let fee = net.config().gas_price().checked_mul(receipt.gas_used).unwrap();
        let expected = Wei::ether(99).checked_sub(fee).unwrap();
        assert_eq!(net.balance(&accounts[0]).unwrap(), expected);
        assert_eq!(net.nonce(&accounts[0]).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_sender_rejected() {
        let net = devnet();
        let res = net
            .send_transaction(TxRequest { from: Address([0xee; 20]), ..Default::default() })
            .await;
        assert!(matches!(res, Err(DevnetError::UnknownAccount(_))));
        assert_eq!(net.block_number(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sends_mine_in_order() {
        use crate::contracts::inbox;
        use crate::crypto::contract_address;
        use crate::state::AccountLocks;

        let net = Arc::new(devnet());
        let accounts = net.accounts();
        let deployer = accounts[0];
        let code = inbox::compile().unwrap().bytecode;
        let mut data = code.clone();
        data.extend(crate::abi::encode(&[inbox::INITIAL_STRING.into()]));

        // run past the first nonce whose contract shares the deployer's stripe
        let stripes = AccountLocks::default();
        let colliding = (0..10_000u64)
            .find(|n| stripes.stripe_of(&contract_address(&deployer, *n)) == stripes.stripe_of(&deployer))
            .unwrap();
        let deploys = colliding + 1;

        let mut tasks = Vec::new();
        for _ in 0..deploys {
            let net = Arc::clone(&net);
            let data = data.clone();
            tasks.push(tokio::spawn(async move {
                net.send_transaction(TxRequest {
                    from: deployer,
                    gas: Some(1_000_000),
                    data: Some(data),
                    ..Default::default()
                })
                .await
            }));
        }
        for _ in 0..5 {
            let net = Arc::clone(&net);
            let (from, to) = (accounts[1], accounts[2]);
            tasks.push(tokio::spawn(async move {
                net.send_transaction(TxRequest { from, to: Some(to), value: Some(Wei(1)), ..Default::default() })
                    .await
            }));
        }

        let hashes = tokio::time::timeout(std::time::Duration::from_secs(60), futures::future::join_all(tasks))
            .await
            .expect("concurrent sends must not hang");
        let total = deploys + 5;

        let mut blocks = Vec::new();
        let mut created = Vec::new();
        for h in hashes {
            let receipt = net.receipt(&h.unwrap().unwrap()).unwrap();
            assert!(receipt.status, "{:?}", receipt.error);
            blocks.push(receipt.block_number);
            created.extend(receipt.contract_address);
        }
        blocks.sort_unstable();
        assert_eq!(blocks, (1..=total).collect::<Vec<_>>());
        assert_eq!(net.block_number(), total);
        assert_eq!(net.nonce(&deployer).unwrap(), deploys);
        assert_eq!(net.nonce(&accounts[1]).unwrap(), 5);

        created.sort();
        let mut expected: Vec<_> = (0..deploys).map(|n| contract_address(&deployer, n)).collect();
        expected.sort();
        assert_eq!(created, expected);
    }

    #[tokio::test]
    async fn test_resubmitted_transaction_rejected_before_execution() {
        let net = devnet();
        let accounts = net.accounts();
        let kp = Keypair::derive(&net.config().seed, 1);
        let stx = Transaction {
            from: accounts[1],
            to: Some(accounts[2]),
            value: Wei(1),
            gas: 21_000,
            gas_price: net.config().gas_price(),
            nonce: 0,
            data: vec![],
        }
        .sign(&kp)
        .unwrap();

        net.send_signed_transaction(stx.clone()).await.unwrap();
        let balance = net.balance(&accounts[1]).unwrap();
        match net.send_signed_transaction(stx).await {
            Err(DevnetError::TransactionError(msg)) => assert!(msg.contains("already known"), "{}", msg),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(net.nonce(&accounts[1]).unwrap(), 1);
        assert_eq!(net.balance(&accounts[1]).unwrap(), balance);
        assert_eq!(net.block_number(), 1);
    }

    #[tokio::test]
    async fn test_externally_signed_transaction() {
        let net = devnet();
        let outsider = Keypair::derive("outsider", 0);
        // unfunded sender cannot pay for gas
        let stx = Transaction {
            from: outsider.address(),
            to: Some(net.accounts()[0]),
            value: Wei::ZERO,
            gas: 21_000,
            gas_price: Wei(1),
            nonce: 0,
            data: vec![],
        }
        .sign(&outsider)
        .unwrap();
        assert!(net.send_signed_transaction(stx).await.is_err());
    }
}
