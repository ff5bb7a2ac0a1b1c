use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::primitives::Wei;
use crate::utils::{DevnetError, Result};

/// Devnet configuration. Every field has a default, so a TOML file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevnetConfig {
    /// number of unlocked, pre-funded accounts
    pub accounts: u32,
    /// seed the account keys are derived from
    pub seed: String,
    /// starting balance of each account, in ether
    pub default_balance_ether: u64,
    /// per-block (and therefore per-transaction) gas limit
    pub gas_limit: u64,
    /// gas price used when a transaction does not set one, in wei
    pub gas_price: u64,
    /// gas allowance used when a transaction does not set one
    pub default_gas: u64,
    /// JSON-RPC listen address
    pub rpc_addr: String,
    /// default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            accounts: 10,
            seed: "inbox devnet test seed".to_string(),
            default_balance_ether: 100,
            gas_limit: 6_721_975,
            gas_price: 20_000_000_000,
            default_gas: 90_000,
            rpc_addr: "127.0.0.1:8545".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl DevnetConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| DevnetError::ConfigError(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let cfg: DevnetConfig = toml::from_str(data).map_err(|e| DevnetError::ConfigError(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.accounts == 0 {
            return Err(DevnetError::ConfigError("at least one account is required".into()));
        }
        if self.default_gas > self.gas_limit {
            return Err(DevnetError::ConfigError(format!(
                "default_gas {} exceeds gas_limit {}",
                self.default_gas, self.gas_limit
            )));
        }
        Ok(())
    }

    pub fn default_balance(&self) -> Wei {
        Wei::ether(self.default_balance_ether)
    }

    pub fn gas_price(&self) -> Wei {
        Wei(self.gas_price as u128)
    }
}
