//! [`InjectedWallet`] backed by a JSON-RPC node.

use crate::{
    error::ProviderError,
    wallet::{InjectedWallet, LogStream, Receipt},
};
use alloy_network::{EthereumWallet, ReceiptResponse};
use alloy_primitives::{Address, B256, Bytes, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types::{Filter, TransactionRequest};
use alloy_signer::Signer as _;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use futures::StreamExt;
use lock_config::LockConfig;
use std::{fmt, time::Duration};

/// Wallet provider talking to a node over JSON-RPC.
///
/// Transactions are either signed locally with a private key, or handed to the node via
/// `eth_sendTransaction` for one of its unlocked accounts, the way a browser wallet signs on the
/// user's behalf.
#[derive(Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    /// Account of the local signer, if any.
    local_account: Option<Address>,
    confirmations: u64,
    timeout: Duration,
    poll_interval: Duration,
}

impl RpcWallet {
    /// Connects to `url`, relying on the node's unlocked accounts.
    pub async fn connect(url: &str) -> Result<Self, ProviderError> {
        let provider = ProviderBuilder::new().connect(url).await?.erased();
        Ok(Self::with_provider(provider, None))
    }

    /// Connects to `url`, signing transactions with `signer`.
    pub async fn connect_with_signer(
        url: &str,
        signer: PrivateKeySigner,
    ) -> Result<Self, ProviderError> {
        let account = signer.address();
        let provider =
            ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect(url).await?.erased();
        Ok(Self::with_provider(provider, Some(account)))
    }

    /// Builds the wallet described by `config`.
    ///
    /// Returns `Ok(None)` if no RPC endpoint is configured.
    pub async fn from_config(
        config: &LockConfig,
        private_key: Option<&str>,
    ) -> Result<Option<Self>, ProviderError> {
        let Some(url) = config.eth_rpc_url.as_deref().filter(|_| config.has_wallet()) else {
            return Ok(None);
        };

        let wallet = match private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key
                    .trim()
                    .parse()
                    .map_err(|err| ProviderError::other(format!("invalid private key: {err}")))?;
                Self::connect_with_signer(url, signer).await?
            }
            None => Self::connect(url).await?,
        };
        debug!(target: "lock::provider", url, local = wallet.local_account.is_some(), "connected");

        Ok(Some(
            wallet
                .with_confirmations(config.confirmations)
                .with_timeout(config.transaction_timeout())
                .with_poll_interval(config.poll_interval()),
        ))
    }

    fn with_provider(provider: DynProvider, local_account: Option<Address>) -> Self {
        Self {
            provider,
            local_account,
            confirmations: 1,
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Sets the number of confirmations to wait for.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Sets how long to wait for a transaction to be included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the interval at which new logs are polled.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcWallet")
            .field("local_account", &self.local_account)
            .field("confirmations", &self.confirmations)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InjectedWallet for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        if let Some(account) = self.local_account {
            return Ok(vec![account]);
        }
        Ok(self.provider.get_accounts().await?)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        Ok(self.provider.call(tx).await?)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_inclusion(&self, hash: TxHash) -> Result<(), ProviderError> {
        PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .watch()
            .await?;
        Ok(())
    }

    async fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<Receipt>, ProviderError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| Receipt {
            transaction_hash: receipt.transaction_hash(),
            status: receipt.status(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        }))
    }

    async fn watch_logs(&self, address: Address, event: B256) -> Result<LogStream, ProviderError> {
        let filter = Filter::new().address(address).event_signature(event);
        let poller =
            self.provider.watch_logs(&filter).await?.with_poll_interval(self.poll_interval);
        Ok(poller.into_stream().flat_map(futures::stream::iter).map(|log| log.inner).boxed())
    }
}
