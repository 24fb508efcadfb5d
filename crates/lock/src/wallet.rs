//! The injected wallet provider the client runs against.
//!
//! A browser exposes its wallet as an EIP-1193 provider. [`InjectedWallet`] captures the subset
//! of that surface the Lock flows rely on, so the same flows run against a JSON-RPC node
//! ([`RpcWallet`](crate::RpcWallet)) or an in-memory chain in tests.

use crate::error::ProviderError;
use alloy_primitives::{Address, B256, Bytes, Log, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

/// Stream of raw logs emitted by a contract.
pub type LogStream = BoxStream<'static, Log>;

/// Confirmation record of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    /// `true` if the transaction executed successfully.
    pub status: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// EIP-1193 style wallet provider.
#[async_trait]
pub trait InjectedWallet: fmt::Debug + Send + Sync {
    /// Asks the wallet for access to the user's accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Returns the balance of `address` in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError>;

    /// Executes a read-only call.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError>;

    /// Signs and broadcasts a transaction, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError>;

    /// Resolves once the transaction has been included in a block.
    async fn wait_for_inclusion(&self, hash: TxHash) -> Result<(), ProviderError>;

    /// Looks up the receipt of a transaction, `None` while it is pending.
    async fn get_transaction_receipt(&self, hash: TxHash)
    -> Result<Option<Receipt>, ProviderError>;

    /// Streams logs emitted by `address` whose first topic is `event`.
    async fn watch_logs(&self, address: Address, event: B256) -> Result<LogStream, ProviderError>;
}
