use alloy_primitives::Address;
use clap::{Parser, Subcommand, ValueHint};
use eyre::{Result, WrapErr};
use lock_config::{
    LockConfig,
    figment::{self, Metadata, Profile, Provider, value::Dict, value::Map},
};
use serde::Serialize;
use std::path::PathBuf;

/// Deposit into and withdraw from a time-locked escrow contract.
#[derive(Parser)]
#[command(name = "lock", version, next_display_order = None)]
pub struct LockArgs {
    #[command(subcommand)]
    pub cmd: LockSubcommand,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub wallet: WalletArgs,
}

#[derive(Subcommand)]
pub enum LockSubcommand {
    /// Print the amount currently held by the contract.
    #[command(visible_alias = "b")]
    Balance,

    /// Print the contract's owner, unlock time and balance.
    #[command(visible_alias = "i")]
    Info,

    /// Deposit funds into the contract.
    #[command(visible_alias = "d")]
    Deposit {
        /// The amount to deposit, in ether.
        amount: String,
    },

    /// Withdraw the contract's balance.
    ///
    /// Nothing is submitted while the given unlock time lies in the future.
    #[command(visible_alias = "w")]
    Withdraw {
        /// The unlock time as a Unix timestamp in seconds.
        #[arg(long, short, value_name = "SECS", default_value = "")]
        unlock_time: String,
    },

    /// Follow `FallbackCalled` events until interrupted.
    Watch,
}

/// Options overriding values from `lock.toml` and the environment.
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(next_help_heading = "Config options")]
pub struct ConfigArgs {
    /// Path to the config file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath, value_name = "PATH")]
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// The wallet's RPC endpoint.
    #[arg(long = "rpc-url", short, global = true, value_name = "URL")]
    #[serde(rename = "eth_rpc_url", skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Address of the Lock contract.
    #[arg(long, short, global = true, value_name = "ADDRESS")]
    #[serde(rename = "contract_address", skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// The account to act as, if the wallet exposes several.
    #[arg(long, global = true, value_name = "ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,

    /// Number of confirmations to wait for.
    #[arg(long, global = true, value_name = "CONFIRMATIONS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,

    /// Timeout in seconds for a transaction to be included.
    #[arg(long, global = true, value_name = "SECS")]
    #[serde(rename = "transaction_timeout", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ConfigArgs {
    /// Loads the config, applying these options on top.
    pub fn load_config(&self) -> Result<LockConfig> {
        let figment = match &self.config_path {
            Some(path) => LockConfig::figment_with_file(path),
            None => LockConfig::figment(),
        };
        LockConfig::from_provider(figment.merge(self)).wrap_err("failed to load config")
    }
}

impl Provider for ConfigArgs {
    fn metadata(&self) -> Metadata {
        Metadata::named("Lock CLI Args")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        figment::providers::Serialized::defaults(self).data()
    }
}

/// Wallet signing options.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Wallet options")]
pub struct WalletArgs {
    /// Sign locally with this private key instead of the node's unlocked accounts.
    #[arg(long, global = true, env = "LOCK_PRIVATE_KEY", value_name = "RAW_PRIVATE_KEY")]
    pub private_key: Option<String>,
}
