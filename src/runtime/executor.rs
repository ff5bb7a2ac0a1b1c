//! Runtime Executor
//!
//! Validates signed transactions, runs contract creation and calls through the
//! VM on a per-transaction state overlay, and produces Receipts. Account locks
//! serialize transactions that touch the same sender or target.

use std::collections::BTreeMap;

use bincode::Options;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crypto::{contract_address, Keypair, PublicKey, Signature, Signer, Verifier};
use crate::primitives::{Address, Wei, H256};
use crate::runtime::gas::{self, intrinsic_gas};
use crate::runtime::program_loader::ProgramLoader;
use crate::runtime::runtime_types::{ExecutionContext, Log, RuntimeError};
use crate::runtime::vm::Vm;
use crate::state::{AccountCache, AccountLocks, StateOverlay};
use crate::utils::metrics::{self, METRICS};
use crate::utils::serde_helpers::{as_hex, from_hex, quantity};
use crate::utils::{DevnetError, Result};

/// Upper bound on a decoded raw transaction.
const RAW_TX_LIMIT: u64 = 128 * 1024;

/// Transaction model: value transfer, contract creation (`to == None`) or call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Option<Address>,
    pub value: Wei,
    pub gas: u64,
    pub gas_price: Wei,
    pub nonce: u64,
    #[serde(serialize_with = "as_hex", deserialize_with = "from_hex")]
    pub data: Vec<u8>,
}

impl Transaction {
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DevnetError::TransactionError(e.to_string()))
    }

    pub fn sign(self, keypair: &Keypair) -> Result<SignedTransaction> {
        let signature = keypair.sign(&self.signing_bytes()?);
        Ok(SignedTransaction { tx: self, public_key: keypair.public(), signature })
    }

    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Raw form accepted by `eth_sendRawTransaction` (bincode).
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DevnetError::TransactionError(e.to_string()))
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(RAW_TX_LIMIT)
            .deserialize(raw)
            .map_err(|e| DevnetError::TransactionError(format!("malformed raw transaction: {}", e)))
    }

    /// sha256 of the raw form.
    pub fn hash(&self) -> Result<H256> {
        Ok(H256::digest(&self.encode()?))
    }

    /// Signature valid and made by the key that owns `tx.from`.
    pub fn verify(&self) -> Result<()> {
        if self.public_key.address() != self.tx.from {
            return Err(DevnetError::CryptoError(format!(
                "signer {} does not own {}",
                self.public_key.address(),
                self.tx.from
            )));
        }
        self.public_key.verify(&self.tx.signing_bytes()?, &self.signature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: H256,
    #[serde(with = "quantity")]
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    #[serde(with = "quantity")]
    pub gas_used: u64,
    pub status: bool,
    pub logs: Vec<Log>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Executor limits.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub block_gas_limit: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { block_gas_limit: 6_721_975 }
    }
}

/// Successful execution before fees are settled.
struct Outcome {
    gas_used: u64,
    contract_address: Option<Address>,
    logs: Vec<Log>,
}

/// Failed execution: the error and the gas it consumed.
struct Failure {
    err: RuntimeError,
    gas_used: u64,
}

/// Read-only call request (`eth_call`).
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: Wei,
    pub gas: u64,
    pub data: Vec<u8>,
}

pub struct Executor {
    pub cache: AccountCache,
    pub locks: AccountLocks,
    pub cfg: ExecutorConfig,
}

impl Executor {
    pub fn new(cache: AccountCache, locks: AccountLocks, cfg: ExecutorConfig) -> Self {
        Self { cache, locks, cfg }
    }

    /// Validate and apply one transaction.
    ///
    /// `Err` means the transaction was rejected and must not be mined.
    /// A failing execution still yields a receipt with `status == false`: its
    /// state changes are discarded, but the nonce is bumped and gas is paid.
    /// `block_number` on the returned receipt is left for the ledger to fill.
    pub async fn execute(&self, stx: &SignedTransaction) -> Result<Receipt> {
        stx.verify()?;
        let tx = &stx.tx;
        let hash = stx.hash()?;

        // one acquire for every account touched: stripes are taken once, in order
        let created = tx.is_create().then(|| contract_address(&tx.from, tx.nonce));
        let mut keys = vec![tx.from];
        keys.extend(tx.to.or(created));
        let _guard = self.locks.acquire(keys).await;

        let sender = self.cache.get_or_default(&tx.from)?;
        if tx.nonce != sender.nonce {
            return Err(DevnetError::TransactionError(format!(
                "nonce mismatch for {}: expected {}, got {}",
                tx.from, sender.nonce, tx.nonce
            )));
        }
        let intrinsic = intrinsic_gas(&tx.data, tx.is_create());
        if tx.gas < intrinsic {
            return Err(DevnetError::TransactionError(format!(
                "intrinsic gas too low: need {}, have {}",
                intrinsic, tx.gas
            )));
        }
        if tx.gas > self.cfg.block_gas_limit {
            return Err(DevnetError::TransactionError(format!(
                "gas {} exceeds block gas limit {}",
                tx.gas, self.cfg.block_gas_limit
            )));
        }
        let max_fee = tx
            .gas_price
            .checked_mul(tx.gas)
            .ok_or_else(|| DevnetError::TransactionError("fee overflow".into()))?;
        let upfront = max_fee
            .checked_add(tx.value)
            .ok_or_else(|| DevnetError::TransactionError("fee overflow".into()))?;
        if sender.balance < upfront {
            return Err(DevnetError::TransactionError(format!(
                "insufficient funds for gas * price + value: have {} want {}",
                sender.balance, upfront
            )));
        }

        let mut overlay = StateOverlay::new(&self.cache);
        let result = self.run(&mut overlay, tx, intrinsic, created);

        let receipt = match result {
            Ok(out) => {
                self.settle(&mut overlay, tx, out.gas_used)?;
                let touched = overlay.touched().count();
                overlay.commit()?;
                METRICS.inc_counter(metrics::TX_MINED);
                if out.contract_address.is_some() {
                    METRICS.inc_counter(metrics::CONTRACTS_DEPLOYED);
                }
                debug!(%hash, gas_used = out.gas_used, touched, "transaction succeeded");
                Receipt {
                    transaction_hash: hash,
                    block_number: 0,
                    from: tx.from,
                    to: tx.to,
                    contract_address: out.contract_address,
                    gas_used: out.gas_used,
                    status: true,
                    logs: out.logs,
                    error: None,
                }
            }
            Err(fail) => {
                drop(overlay);
                let mut overlay = StateOverlay::new(&self.cache);
                self.settle(&mut overlay, tx, fail.gas_used)?;
                overlay.commit()?;
                METRICS.inc_counter(metrics::TX_MINED);
                METRICS.inc_counter(metrics::TX_FAILED);
                warn!(%hash, error = %fail.err, "transaction failed");
                Receipt {
                    transaction_hash: hash,
                    block_number: 0,
                    from: tx.from,
                    to: tx.to,
                    contract_address: None,
                    gas_used: fail.gas_used,
                    status: false,
                    logs: Vec::new(),
                    error: Some(fail.err.to_string()),
                }
            }
        };

        self.cache.flush()?;
        Ok(receipt)
    }

    /// Bump the sender nonce and charge `gas_used * gas_price`.
    fn settle(&self, overlay: &mut StateOverlay<'_>, tx: &Transaction, gas_used: u64) -> Result<()> {
        let fee = tx
            .gas_price
            .checked_mul(gas_used)
            .ok_or_else(|| DevnetError::TransactionError("fee overflow".into()))?;
        let sender = overlay.get_mut(&tx.from)?;
        sender.nonce += 1;
        sender.balance = sender
            .balance
            .checked_sub(fee)
            .ok_or_else(|| DevnetError::StateError(format!("{} cannot cover fee {}", tx.from, fee)))?;
        Ok(())
    }

    fn run(
        &self,
        overlay: &mut StateOverlay<'_>,
        tx: &Transaction,
        intrinsic: u64,
        created: Option<Address>,
    ) -> std::result::Result<Outcome, Failure> {
        let state_err = |e: DevnetError, gas_used: u64| Failure {
            err: RuntimeError::InvalidProgram(e.to_string()),
            gas_used,
        };

        let target = match (tx.to, created) {
            (Some(to), _) => to,
            (None, Some(addr)) => addr,
            (None, None) => {
                return Err(Failure { err: RuntimeError::InvalidProgram("missing target".into()), gas_used: tx.gas })
            }
        };

        // value transfer
        if tx.value > Wei::ZERO {
            let from = overlay.get_mut(&tx.from).map_err(|e| state_err(e, intrinsic))?;
            from.balance = from.balance.checked_sub(tx.value).ok_or(Failure {
                err: RuntimeError::Revert("insufficient balance for transfer".into()),
                gas_used: intrinsic,
            })?;
            let to = overlay.get_mut(&target).map_err(|e| state_err(e, intrinsic))?;
            to.balance = to.balance.checked_add(tx.value).ok_or(Failure {
                err: RuntimeError::Revert("balance overflow".into()),
                gas_used: intrinsic,
            })?;
        }

        let mut ctx = ExecutionContext::new(tx.from, target, tx.value, tx.gas - intrinsic);

        if tx.is_create() {
            let existing = overlay.get(&target).map_err(|e| state_err(e, intrinsic))?;
            if existing.is_contract() || existing.nonce > 0 {
                return Err(Failure { err: RuntimeError::ContractCollision(target), gas_used: tx.gas });
            }
            let (program, ctor_args) = ProgramLoader::load(&tx.data).map_err(|err| Failure { err, gas_used: tx.gas })?;
            ctx = ctx.with_args(ctor_args);

            let account = overlay.get_mut(&target).map_err(|e| state_err(e, intrinsic))?;
            account.nonce = 1;
            let mut storage = std::mem::take(&mut account.storage);
            let res = Vm::execute(&mut ctx, &mut storage, &program.constructor);
            let gas_so_far = intrinsic + ctx.gas_used;
            res.map_err(|err| Failure { err, gas_used: gas_so_far })?;

            let code = ProgramLoader::runtime_code(&program).map_err(|err| Failure { err, gas_used: gas_so_far })?;
            ctx.charge(gas::CODE_DEPOSIT_PER_BYTE * code.len() as u64)
                .map_err(|err| Failure { err, gas_used: tx.gas })?;

            let account = overlay.get_mut(&target).map_err(|e| state_err(e, intrinsic))?;
            account.storage = storage;
            account.code = code;
            debug!(address = %target, "contract created");

            return Ok(Outcome { gas_used: intrinsic + ctx.gas_used, contract_address: Some(target), logs: ctx.logs });
        }

        let code = overlay.get(&target).map_err(|e| state_err(e, intrinsic))?.code;
        if code.is_empty() {
            // plain transfer
            return Ok(Outcome { gas_used: intrinsic, contract_address: None, logs: Vec::new() });
        }
        let (program, _) = ProgramLoader::load(&code).map_err(|err| Failure { err, gas_used: tx.gas })?;
        ctx = ctx.with_calldata(&tx.data);

        let account = overlay.get_mut(&target).map_err(|e| state_err(e, intrinsic))?;
        let mut storage = std::mem::take(&mut account.storage);
        let res = Vm::execute(&mut ctx, &mut storage, &program.body);
        let gas_used = intrinsic + ctx.gas_used;
        res.map_err(|err| Failure { err, gas_used })?;

        let account = overlay.get_mut(&target).map_err(|e| state_err(e, intrinsic))?;
        account.storage = storage;
        Ok(Outcome { gas_used, contract_address: None, logs: ctx.logs })
    }

    /// Execute against current state without committing anything.
    pub fn call(&self, req: &CallRequest) -> Result<Vec<u8>> {
        METRICS.inc_counter(metrics::CALLS);
        let target = self.cache.get_or_default(&req.to)?;
        if !target.is_contract() {
            return Ok(Vec::new());
        }
        let (program, _) = ProgramLoader::load(&target.code)?;
        let mut ctx = ExecutionContext::new(req.from, req.to, req.value, req.gas)
            .with_calldata(&req.data)
            .read_only();
        let mut storage: BTreeMap<u64, Vec<u8>> = target.storage;
        let out = Vm::execute(&mut ctx, &mut storage, &program.body)?;
        Ok(out)
    }
}
