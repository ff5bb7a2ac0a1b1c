use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::contracts::inbox;
use crate::node::{Devnet, DevnetConfig};
use crate::rpc::RpcServer;
use crate::utils::init_logging;

/// In-memory development chain.
#[derive(Parser)]
#[clap(name = "inbox-devnet", version)]
pub struct Cli {
    /// Path to a TOML config file
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Run the devnet and serve JSON-RPC
    Run {
        /// rpc bind address (host:port)
        #[clap(long)]
        rpc: Option<String>,

        /// number of unlocked accounts
        #[clap(long)]
        accounts: Option<u32>,
    },
    /// Print the unlocked accounts and their balances
    Accounts,
    /// Print the compiled message box contract (interface JSON and bytecode)
    Compile,
}

fn load_config(path: Option<&PathBuf>) -> Result<DevnetConfig> {
    Ok(match path {
        Some(p) => DevnetConfig::load(p)?,
        None => DevnetConfig::default(),
    })
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_ref())?;

    match cli.cmd {
        Cmd::Run { rpc, accounts } => {
            if let Some(rpc) = rpc {
                cfg.rpc_addr = rpc;
            }
            if let Some(n) = accounts {
                cfg.accounts = n;
            }
            init_logging(&cfg.log_level);

            let devnet = Devnet::shared(cfg.clone())?;
            for (i, a) in devnet.accounts().iter().enumerate() {
                info!("({}) {}", i, a);
            }
            let (addr, svc) = RpcServer::new(cfg.rpc_addr.clone(), devnet).start().await?;
            info!("devnet ready on http://{}", addr);

            tokio::signal::ctrl_c().await?;
            info!("shutting down devnet");
            svc.shutdown().await?;
            Ok(())
        }
        Cmd::Accounts => {
            let devnet = Devnet::new(cfg)?;
            for (i, a) in devnet.accounts().iter().enumerate() {
                println!("({}) {} {} wei", i, a, devnet.balance(a)?);
            }
            Ok(())
        }
        Cmd::Compile => {
            let compiled = inbox::compile()?;
            println!("interface: {}", compiled.interface);
            println!("bytecode: 0x{}", hex::encode(&compiled.bytecode));
            Ok(())
        }
    }
}
