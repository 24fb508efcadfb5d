//! Typed access to the Lock contract.

use crate::{
    connector::{ChainConnector, Signer},
    error::{LockError, ProviderError},
    wallet::{LogStream, Receipt},
};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{SolCall, SolEvent, sol};
use std::fmt;

sol! {
    #[sol(abi)]
    #[derive(Debug, PartialEq, Eq)]
    interface ILock {
        event Withdrawal(uint256 amount, uint256 when);
        event FallbackCalled(address caller, uint256 value);

        function unlockTime() external view returns (uint256);
        function owner() external view returns (address);
        function withdraw() external;
    }
}

pub use ILock::{FallbackCalled, Withdrawal};

/// The Lock contract's address together with its interface description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockBinding {
    address: Address,
    abi: JsonAbi,
}

impl LockBinding {
    /// Binds the compiled-in Lock interface to `address`.
    pub fn new(address: Address) -> Self {
        Self { address, abi: ILock::abi::contract() }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }
}

/// Marker for a proxy constructed from a plain provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOnly;

/// Marker for a proxy that can submit transactions.
#[derive(Clone, Debug)]
pub struct Signing(Signer);

/// Lock contract bound to a [`ChainConnector`].
///
/// Only a [`LockProxy<Signing>`] exposes state-changing calls.
#[derive(Clone, Debug)]
pub struct LockProxy<M = ReadOnly> {
    binding: LockBinding,
    connector: ChainConnector,
    mode: M,
}

impl LockProxy<ReadOnly> {
    pub fn new(binding: LockBinding, connector: ChainConnector) -> Self {
        Self { binding, connector, mode: ReadOnly }
    }

    /// Upgrades into a write-capable proxy acting as `signer`.
    pub fn with_signer(self, signer: Signer) -> LockProxy<Signing> {
        LockProxy { binding: self.binding, connector: self.connector, mode: Signing(signer) }
    }
}

impl<M> LockProxy<M> {
    pub fn address(&self) -> Address {
        self.binding.address()
    }

    pub fn binding(&self) -> &LockBinding {
        &self.binding
    }

    /// Returns the contract's balance in wei.
    pub async fn balance(&self) -> Result<U256, ProviderError> {
        self.connector.get_balance(self.address()).await
    }

    /// Returns the timestamp after which the owner may withdraw.
    pub async fn unlock_time(&self) -> Result<U256, ProviderError> {
        let out = self.call(ILock::unlockTimeCall {}).await?;
        ILock::unlockTimeCall::abi_decode_returns(&out).map_err(decode_err)
    }

    /// Returns the account the balance is released to.
    pub async fn owner(&self) -> Result<Address, ProviderError> {
        let out = self.call(ILock::ownerCall {}).await?;
        ILock::ownerCall::abi_decode_returns(&out).map_err(decode_err)
    }

    /// Streams raw `FallbackCalled` logs emitted by the contract.
    pub async fn fallback_called_logs(&self) -> Result<LogStream, ProviderError> {
        self.connector.watch_logs(self.address(), FallbackCalled::SIGNATURE_HASH).await
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<alloy_primitives::Bytes, ProviderError> {
        let tx = TransactionRequest::default().to(self.address()).input(call.abi_encode().into());
        self.connector.call(tx).await
    }
}

impl LockProxy<Signing> {
    pub fn signer(&self) -> &Signer {
        &self.mode.0
    }

    /// Calls `withdraw()`.
    ///
    /// Whether it succeeds is decided on-chain by the unlock time and owner checks.
    pub async fn withdraw(&self) -> Result<PendingTransaction, LockError> {
        let tx = TransactionRequest::default()
            .to(self.address())
            .input(ILock::withdrawCall {}.abi_encode().into());
        PendingTransaction::submit(self.signer(), self.address(), None, tx).await
    }

    /// Sends `value` wei to the contract.
    pub async fn deposit(&self, value: U256) -> Result<PendingTransaction, LockError> {
        let tx = TransactionRequest::default().to(self.address()).value(value);
        PendingTransaction::submit(self.signer(), self.address(), Some(value), tx).await
    }
}

/// A submitted transaction awaiting confirmation.
#[derive(Clone, Debug)]
pub struct PendingTransaction {
    target: Address,
    amount: Option<U256>,
    hash: TxHash,
    receipt: Option<Receipt>,
    connector: ChainConnector,
}

impl PendingTransaction {
    async fn submit(
        signer: &Signer,
        target: Address,
        amount: Option<U256>,
        tx: TransactionRequest,
    ) -> Result<Self, LockError> {
        let hash = signer.send_transaction(tx).await.map_err(LockError::SubmissionFailure)?;
        Ok(Self { target, amount, hash, receipt: None, connector: signer.connector().clone() })
    }

    pub fn target(&self) -> Address {
        self.target
    }

    /// The value sent along, `None` for contract calls.
    pub fn amount(&self) -> Option<U256> {
        self.amount
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// The receipt, once [`resolve`](Self::resolve) has fetched it.
    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    /// Waits for inclusion, then fetches and inspects the receipt.
    ///
    /// Returns the receipt if the transaction succeeded.
    pub async fn resolve(&mut self) -> Result<Receipt, LockError> {
        self.connector.wait_for_inclusion(self.hash).await.map_err(LockError::SubmissionFailure)?;

        let receipt = self
            .connector
            .get_transaction_receipt(self.hash)
            .await
            .map_err(LockError::SubmissionFailure)?
            .ok_or(LockError::ReceiptUnavailable(self.hash))?;
        debug!(target: "lock::tx", ?receipt, "fetched receipt");
        self.receipt = Some(receipt.clone());

        if receipt.status { Ok(receipt) } else { Err(LockError::OnChainRevert(self.hash)) }
    }
}

impl fmt::Display for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.hash, self.target)?;
        if let Some(amount) = self.amount {
            write!(f, " ({amount} wei)")?;
        }
        Ok(())
    }
}

fn decode_err(err: alloy_sol_types::Error) -> ProviderError {
    ProviderError::other(format!("failed to decode return data: {err}"))
}
