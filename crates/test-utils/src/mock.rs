use alloy_primitives::{Address, B256, Bytes, Log, TxHash, U256, keccak256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use futures::StreamExt;
use lock_dapp::{
    InjectedWallet, LogStream, ProviderError, Receipt,
    contract::{FallbackCalled, ILock, Withdrawal},
};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::broadcast::{self, error::RecvError};

/// An in-memory chain hosting a single Lock contract.
///
/// Plain value transfers to the contract are credited and emit `FallbackCalled`; `withdraw()`
/// succeeds only for the owner once the chain's timestamp reaches the unlock time.
#[derive(Clone, Debug)]
pub struct MockWallet {
    chain: Arc<Mutex<MockChain>>,
    logs: broadcast::Sender<Log>,
}

#[derive(Debug, Default)]
struct MockChain {
    contract: Address,
    owner: Address,
    unlock_time: u64,
    timestamp: u64,
    block_number: u64,
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    receipts: HashMap<TxHash, Receipt>,
    submitted: Vec<TransactionRequest>,
    account_requests: usize,
    reject_accounts: Option<String>,
    reject_transactions: Option<String>,
    reject_log_watch: Option<String>,
    drop_receipts: bool,
}

impl MockWallet {
    /// Creates a chain where `owner` is the only account and the lock is already open.
    pub fn new(contract: Address, owner: Address) -> Self {
        let chain = MockChain {
            contract,
            owner,
            accounts: vec![owner],
            timestamp: 1_700_000_000,
            ..Default::default()
        };
        let (logs, _) = broadcast::channel(64);
        Self { chain: Arc::new(Mutex::new(chain)), logs }
    }

    /// Sets the accounts granted on authorization.
    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        self.chain.lock().accounts = accounts;
        self
    }

    pub fn with_unlock_time(self, unlock_time: u64) -> Self {
        self.chain.lock().unlock_time = unlock_time;
        self
    }

    /// Sets the timestamp of the next block.
    pub fn with_timestamp(self, timestamp: u64) -> Self {
        self.chain.lock().timestamp = timestamp;
        self
    }

    pub fn with_contract_balance(self, balance: U256) -> Self {
        {
            let mut chain = self.chain.lock();
            let contract = chain.contract;
            chain.balances.insert(contract, balance);
        }
        self
    }

    /// Makes the wallet refuse account access.
    pub fn reject_authorization(self, reason: impl Into<String>) -> Self {
        self.chain.lock().reject_accounts = Some(reason.into());
        self
    }

    /// Makes the wallet refuse to sign transactions.
    pub fn reject_transactions(self, reason: impl Into<String>) -> Self {
        self.chain.lock().reject_transactions = Some(reason.into());
        self
    }

    /// Makes subsequent log subscriptions fail, e.g. when the node drops its filter support.
    pub fn fail_log_watch(&self, reason: impl Into<String>) {
        self.chain.lock().reject_log_watch = Some(reason.into());
    }

    /// Mines transactions without returning receipts for them.
    pub fn without_receipts(self) -> Self {
        self.chain.lock().drop_receipts = true;
        self
    }

    pub fn contract_balance(&self) -> U256 {
        let chain = self.chain.lock();
        chain.balance_of(chain.contract)
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.chain.lock().balance_of(address)
    }

    /// All transactions submitted so far, in order.
    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.chain.lock().submitted.clone()
    }

    /// How often account access was requested.
    pub fn account_requests(&self) -> usize {
        self.chain.lock().account_requests
    }

    /// Emits `FallbackCalled(caller, value)` from the contract.
    ///
    /// Returns the number of open log streams that received it.
    pub fn emit_fallback_called(&self, caller: Address, value: U256) -> usize {
        let contract = self.chain.lock().contract;
        let log = Log { address: contract, data: FallbackCalled { caller, value }.encode_log_data() };
        self.logs.send(log).unwrap_or_default()
    }

    /// Emits a log the Lock interface cannot decode.
    pub fn emit_garbage(&self) -> usize {
        let contract = self.chain.lock().contract;
        let log = Log::new_unchecked(
            contract,
            vec![FallbackCalled::SIGNATURE_HASH],
            Bytes::from_static(&[0xde, 0xad]),
        );
        self.logs.send(log).unwrap_or_default()
    }

    /// Number of open log streams.
    pub fn log_subscribers(&self) -> usize {
        self.logs.receiver_count()
    }
}

impl MockChain {
    fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }

    /// Executes `tx` and returns its receipt plus any logs it emitted.
    fn execute(&mut self, tx: &TransactionRequest) -> (Receipt, Vec<Log>) {
        self.block_number += 1;
        let from = tx.from.unwrap_or_default();
        let to = tx.to.and_then(|kind| kind.to().copied());
        let value = tx.value.unwrap_or_default();
        let input = tx.input.input().cloned().unwrap_or_default();

        let mut logs = Vec::new();
        let status = if to != Some(self.contract) {
            self.transfer(from, to.unwrap_or_default(), value);
            true
        } else if input.starts_with(&ILock::withdrawCall::SELECTOR) {
            if self.timestamp >= self.unlock_time && from == self.owner {
                let amount = self.balance_of(self.contract);
                self.transfer(self.contract, self.owner, amount);
                logs.push(Log {
                    address: self.contract,
                    data: Withdrawal { amount, when: U256::from(self.timestamp) }.encode_log_data(),
                });
                true
            } else {
                false
            }
        } else {
            // receive / fallback
            self.transfer(from, self.contract, value);
            logs.push(Log {
                address: self.contract,
                data: FallbackCalled { caller: from, value }.encode_log_data(),
            });
            true
        };

        let hash = keccak256(self.submitted.len().to_be_bytes());
        let receipt = Receipt {
            transaction_hash: hash,
            status,
            block_number: Some(self.block_number),
            gas_used: 21_000,
        };
        (receipt, logs)
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) {
        let sender = self.balances.entry(from).or_default();
        *sender = sender.saturating_sub(value);
        *self.balances.entry(to).or_default() += value;
    }
}

#[async_trait]
impl InjectedWallet for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut chain = self.chain.lock();
        chain.account_requests += 1;
        if let Some(reason) = &chain.reject_accounts {
            return Err(ProviderError::rejected("Account access", reason.clone()));
        }
        Ok(chain.accounts.clone())
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        Ok(self.balance_of(address))
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        let chain = self.chain.lock();
        let input = tx.input.input().cloned().unwrap_or_default();
        if input.starts_with(&ILock::unlockTimeCall::SELECTOR) {
            Ok(U256::from(chain.unlock_time).abi_encode().into())
        } else if input.starts_with(&ILock::ownerCall::SELECTOR) {
            Ok(chain.owner.abi_encode().into())
        } else {
            Err(ProviderError::other("execution reverted"))
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        let (receipt, logs) = {
            let mut chain = self.chain.lock();
            if let Some(reason) = &chain.reject_transactions {
                return Err(ProviderError::rejected("Transaction", reason.clone()));
            }
            chain.submitted.push(tx.clone());
            let (receipt, logs) = chain.execute(&tx);
            chain.receipts.insert(receipt.transaction_hash, receipt.clone());
            (receipt, logs)
        };
        trace!(?receipt, "mined mock transaction");

        for log in logs {
            let _ = self.logs.send(log);
        }
        Ok(receipt.transaction_hash)
    }

    async fn wait_for_inclusion(&self, hash: TxHash) -> Result<(), ProviderError> {
        if self.chain.lock().receipts.contains_key(&hash) {
            Ok(())
        } else {
            Err(ProviderError::other(format!("unknown transaction {hash}")))
        }
    }

    async fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<Receipt>, ProviderError> {
        let chain = self.chain.lock();
        if chain.drop_receipts {
            return Ok(None);
        }
        Ok(chain.receipts.get(&hash).cloned())
    }

    async fn watch_logs(&self, address: Address, event: B256) -> Result<LogStream, ProviderError> {
        if let Some(reason) = &self.chain.lock().reject_log_watch {
            return Err(ProviderError::other(reason.clone()));
        }
        let rx = self.logs.subscribe();
        let stream = futures::stream::unfold(rx, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(log) if log.address == address && log.topics().first() == Some(&event) => {
                        return Some((log, rx));
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }
}
