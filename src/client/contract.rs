//! Typed contract handle: deploy with constructor arguments, call view
//! functions, send state-changing ones.

use tracing::debug;

use crate::abi::{Abi, Function, Token};
use crate::client::web3::Eth;
use crate::node::{CallArgs, TxRequest};
use crate::primitives::{Address, Wei};
use crate::runtime::Receipt;
use crate::utils::{DevnetError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractOptions {
    /// Set once the contract is deployed.
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub data: Vec<u8>,
    pub arguments: Vec<Token>,
}

/// Sender and gas for a transaction. Unset gas uses the node default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    pub from: Address,
    pub gas: Option<u64>,
    pub value: Option<Wei>,
}

impl SendOptions {
    pub fn new(from: Address) -> Self {
        Self { from, gas: None, value: None }
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn value(mut self, value: Wei) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Clone)]
pub struct Contract {
    eth: Eth,
    abi: Abi,
    pub options: ContractOptions,
}

impl Contract {
    pub fn new(eth: Eth, abi: Abi) -> Self {
        Self { eth, abi, options: ContractOptions::default() }
    }

    /// Handle on an already deployed contract.
    pub fn at(eth: Eth, abi: Abi, address: Address) -> Self {
        Self { eth, abi, options: ContractOptions { address: Some(address) } }
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn address(&self) -> Result<Address> {
        self.options
            .address
            .ok_or_else(|| DevnetError::TransactionError("contract has not been deployed".into()))
    }

    /// Prepare a deployment. Constructor arguments are checked here.
    pub fn deploy(&self, opts: DeployOptions) -> Result<Deployer<'_>> {
        let args = match self.abi.constructor() {
            Some(ctor) => ctor.encode_input(&opts.arguments)?,
            None if opts.arguments.is_empty() => Vec::new(),
            None => {
                return Err(DevnetError::AbiError(format!(
                    "interface has no constructor but {} argument(s) were given",
                    opts.arguments.len()
                )))
            }
        };
        let mut data = opts.data;
        data.extend(args);
        Ok(Deployer { contract: self, data })
    }

    /// Bind a function call. Arity and argument types are checked here.
    pub fn method(&self, name: &str, args: Vec<Token>) -> Result<MethodCall<'_>> {
        let function = self.abi.function(name)?;
        let data = function.encode_input(&args)?;
        Ok(MethodCall { contract: self, function, data })
    }
}

pub struct Deployer<'a> {
    contract: &'a Contract,
    data: Vec<u8>,
}

impl Deployer<'_> {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Send the creation transaction and return a handle on the new contract.
    pub async fn send(self, opts: SendOptions) -> Result<Contract> {
        let eth = &self.contract.eth;
        let receipt = eth
            .send_and_confirm(TxRequest {
                from: opts.from,
                gas: opts.gas,
                value: opts.value,
                data: Some(self.data),
                ..Default::default()
            })
            .await?;
        let address = receipt.contract_address.ok_or_else(|| {
            DevnetError::TransactionError(format!("{} created no contract", receipt.transaction_hash))
        })?;
        debug!(%address, gas_used = receipt.gas_used, "contract deployed");
        Ok(Contract::at(eth.clone(), self.contract.abi.clone(), address))
    }
}

pub struct MethodCall<'a> {
    contract: &'a Contract,
    function: &'a Function,
    data: Vec<u8>,
}

impl MethodCall<'_> {
    /// Read-only call, decoded against the function outputs.
    pub async fn call(&self) -> Result<Vec<Token>> {
        self.call_from(None).await
    }

    pub async fn call_from(&self, from: Option<Address>) -> Result<Vec<Token>> {
        let out = self
            .contract
            .eth
            .call(CallArgs {
                from,
                to: self.contract.address()?,
                data: Some(self.data.clone()),
                ..Default::default()
            })
            .await?;
        self.function.decode_output(&out)
    }

    /// Send as a transaction and wait for the mined receipt.
    pub async fn send(&self, opts: SendOptions) -> Result<Receipt> {
        self.contract
            .eth
            .send_and_confirm(TxRequest {
                from: opts.from,
                to: Some(self.contract.address()?),
                gas: opts.gas,
                value: opts.value,
                data: Some(self.data.clone()),
                ..Default::default()
            })
            .await
    }
}
