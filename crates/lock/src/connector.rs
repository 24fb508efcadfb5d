use crate::{
    error::{LockError, ProviderError},
    wallet::{InjectedWallet, LogStream, Receipt},
};
use alloy_primitives::{Address, B256, Bytes, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use std::sync::Arc;

/// Read and write access to the network through the injected wallet.
#[derive(Clone, Debug)]
pub struct ChainConnector {
    wallet: Arc<dyn InjectedWallet>,
}

impl ChainConnector {
    /// Wraps the environment-provided wallet.
    ///
    /// Returns [`LockError::WalletUnavailable`] if the environment has none.
    pub fn new(wallet: Option<Arc<dyn InjectedWallet>>) -> Result<Self, LockError> {
        wallet.map(|wallet| Self { wallet }).ok_or(LockError::WalletUnavailable)
    }

    /// Wraps a concrete wallet implementation.
    pub fn from_wallet(wallet: impl InjectedWallet + 'static) -> Self {
        Self { wallet: Arc::new(wallet) }
    }

    pub async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.wallet.request_accounts().await
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        self.wallet.get_balance(address).await
    }

    pub async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        self.wallet.call(tx).await
    }

    pub async fn wait_for_inclusion(&self, hash: TxHash) -> Result<(), ProviderError> {
        self.wallet.wait_for_inclusion(hash).await
    }

    pub async fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<Receipt>, ProviderError> {
        self.wallet.get_transaction_receipt(hash).await
    }

    pub async fn watch_logs(&self, address: Address, event: B256) -> Result<LogStream, ProviderError> {
        self.wallet.watch_logs(address, event).await
    }

    /// Returns a signer bound to an authorized account.
    pub fn signer(&self, address: Address) -> Signer {
        Signer { address, connector: self.clone() }
    }
}

/// Capability to submit transactions from one authorized account.
#[derive(Clone, Debug)]
pub struct Signer {
    address: Address,
    connector: ChainConnector,
}

impl Signer {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn connector(&self) -> &ChainConnector {
        &self.connector
    }

    /// Sends `tx` from this signer's account.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        let tx = tx.from(self.address);
        trace!(target: "lock::tx", from = %self.address, ?tx, "sending transaction");
        self.connector.wallet.send_transaction(tx).await
    }
}
