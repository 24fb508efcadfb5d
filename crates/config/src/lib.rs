//! # lock-config
//!
//! Configuration for the Lock escrow client.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, address};
use figment::{
    Error, Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

// reexport so callers can merge their own providers, e.g. CLI flags
pub use figment;

/// Lock client configuration.
///
/// # Provider Details
///
/// Values are resolved in the following order, later sources overriding earlier ones:
///
/// 1. the compiled-in defaults ([`LockConfig::default()`])
/// 2. the TOML file at `$LOCK_CONFIG`, or `./lock.toml`
/// 3. `ETH_RPC_URL`
/// 4. `LOCK_`-prefixed environment variables, e.g. `LOCK_CONFIRMATIONS=2`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Address of the deployed Lock contract.
    pub contract_address: Address,
    /// JSON-RPC endpoint of the wallet provider.
    ///
    /// When unset there is no wallet and every flow is a no-op.
    pub eth_rpc_url: Option<String>,
    /// Preferred account when the provider exposes several.
    pub sender: Option<Address>,
    /// Number of confirmations to wait for before inspecting a receipt.
    pub confirmations: u64,
    /// Timeout in seconds for a submitted transaction to be included.
    pub transaction_timeout: u64,
    /// Interval in milliseconds at which new contract logs are polled.
    pub poll_interval_ms: u64,
}

impl LockConfig {
    /// The default name of the config file.
    pub const FILE_NAME: &'static str = "lock.toml";

    /// Environment variable pointing at an alternative config file.
    pub const CONFIG_ENV: &'static str = "LOCK_CONFIG";

    /// Prefix of the environment variables merged into the config.
    pub const ENV_PREFIX: &'static str = "LOCK_";

    /// The Lock deployment the client talks to unless configured otherwise.
    pub const DEFAULT_CONTRACT_ADDRESS: Address =
        address!("0xE6E340D132b5f46d1e472DebcD681B2aBc16e57E");

    /// Loads the config from the current working directory and the environment.
    pub fn load() -> Result<Self, Error> {
        Self::from_provider(Self::figment())
    }

    /// Loads the config using the given TOML file instead of the default lookup.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_provider(Self::figment_with_file(path.as_ref()))
    }

    /// Extracts a config from any figment [`Provider`].
    pub fn from_provider<T: Provider>(provider: T) -> Result<Self, Error> {
        let config = Figment::from(provider).extract::<Self>()?;
        trace!(target: "lock::config", ?config, "loaded config");
        Ok(config)
    }

    /// Returns the default figment: defaults, config file, then environment.
    pub fn figment() -> Figment {
        Self::figment_with_file(&Self::config_file())
    }

    /// Returns the default figment, reading the TOML file at `path`.
    pub fn figment_with_file(path: &Path) -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(path))
            .merge(Env::raw().only(&["ETH_RPC_URL"]))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["CONFIG", "PRIVATE_KEY"]))
    }

    /// Path of the config file to read.
    pub fn config_file() -> PathBuf {
        std::env::var_os(Self::CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::FILE_NAME))
    }

    /// Whether a wallet provider endpoint is configured.
    pub fn has_wallet(&self) -> bool {
        self.eth_rpc_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }

    /// The inclusion timeout as a [`Duration`].
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout)
    }

    /// The log polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Provider for LockConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Lock Config")
    }

    #[track_caller]
    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        Serialized::defaults(self).data()
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            contract_address: Self::DEFAULT_CONTRACT_ADDRESS,
            eth_rpc_url: None,
            sender: None,
            confirmations: 1,
            transaction_timeout: 120,
            poll_interval_ms: 1000,
        }
    }
}
