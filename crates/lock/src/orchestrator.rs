//! Deposit and withdraw flows.
//!
//! Each flow runs strictly in order: authorize, submit, wait for inclusion, inspect the receipt.
//! Errors never escape a flow; they are logged and reported as a [`FlowOutcome`].

use crate::{
    connector::ChainConnector,
    contract::{LockBinding, LockProxy, PendingTransaction, Signing},
    error::LockError,
    gate::WalletGate,
    state::ViewState,
    sync::StateSynchronizer,
    wallet::Receipt,
};
use std::{fmt, sync::Arc};

/// Why a flow returned without submitting anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// There is no injected wallet.
    WalletUnavailable,
    /// The deposit field is empty.
    EmptyDeposit,
    /// The declared unlock time lies in the future.
    UnlockTimeNotReached { unlock_time: u64, now: u64 },
    /// The unlock-time field is not a Unix timestamp.
    MalformedUnlockTime(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WalletUnavailable => f.write_str("no injected wallet"),
            Self::EmptyDeposit => f.write_str("no deposit amount entered"),
            Self::UnlockTimeNotReached { unlock_time, now } => {
                write!(f, "unlock time {unlock_time} has not arrived yet (now {now})")
            }
            Self::MalformedUnlockTime(input) => write!(f, "invalid unlock time {input:?}"),
        }
    }
}

/// Result of a deposit or withdraw flow.
#[derive(Debug)]
pub enum FlowOutcome {
    /// The transaction was mined successfully; `state` is the refreshed view.
    Confirmed { receipt: Receipt, state: ViewState },
    /// Preconditions did not hold, nothing was submitted.
    Skipped(SkipReason),
    /// The flow aborted or the transaction failed on-chain.
    Failed(LockError),
}

impl FlowOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn error(&self) -> Option<&LockError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The view produced by a confirmed flow.
    pub fn state(&self) -> Option<&ViewState> {
        match self {
            Self::Confirmed { state, .. } => Some(state),
            _ => None,
        }
    }
}

/// Drives the deposit and withdraw flows.
#[derive(Debug)]
pub struct TransactionOrchestrator {
    binding: LockBinding,
    connector: Option<ChainConnector>,
    gate: Arc<WalletGate>,
    sync: StateSynchronizer,
}

impl TransactionOrchestrator {
    pub fn new(
        binding: LockBinding,
        connector: Option<ChainConnector>,
        gate: Arc<WalletGate>,
        sync: StateSynchronizer,
    ) -> Self {
        Self { binding, connector, gate, sync }
    }

    /// Sends the amount in `state.deposit_input` to the contract.
    pub async fn deposit(&self, state: &ViewState) -> FlowOutcome {
        let Some(connector) = &self.connector else {
            return skipped(SkipReason::WalletUnavailable);
        };
        if !state.has_deposit_input() {
            return skipped(SkipReason::EmptyDeposit);
        }

        match self.try_deposit(connector, state).await {
            Ok((receipt, state)) => {
                info!(target: "lock::tx", tx = %receipt.transaction_hash, "deposit confirmed");
                FlowOutcome::Confirmed { receipt, state }
            }
            Err(err) => {
                warn!(target: "lock::tx", %err, "deposit failed");
                FlowOutcome::Failed(err)
            }
        }
    }

    /// Calls `withdraw()` if the declared unlock time has passed.
    pub async fn withdraw(&self, state: &ViewState) -> FlowOutcome {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.withdraw_at(state, now).await
    }

    /// Like [`withdraw`](Self::withdraw), comparing the unlock time against `now`.
    ///
    /// The comparison only avoids pointless submissions; the contract enforces the lock.
    pub async fn withdraw_at(&self, state: &ViewState, now: u64) -> FlowOutcome {
        let Some(connector) = &self.connector else {
            return skipped(SkipReason::WalletUnavailable);
        };
        match state.declared_unlock_time() {
            Ok(Some(unlock_time)) if unlock_time > now => {
                return skipped(SkipReason::UnlockTimeNotReached { unlock_time, now });
            }
            Ok(_) => {}
            Err(_) => {
                return skipped(SkipReason::MalformedUnlockTime(state.unlock_time_input.clone()));
            }
        }

        match self.try_withdraw(connector, state).await {
            Ok((receipt, state)) => {
                info!(target: "lock::tx", tx = %receipt.transaction_hash, "withdrawal confirmed");
                FlowOutcome::Confirmed { receipt, state }
            }
            Err(err) => {
                warn!(target: "lock::tx", %err, "withdrawal failed");
                FlowOutcome::Failed(err)
            }
        }
    }

    async fn try_deposit(
        &self,
        connector: &ChainConnector,
        state: &ViewState,
    ) -> Result<(Receipt, ViewState), LockError> {
        let proxy = self.signing_proxy(connector).await?;
        let value = state.deposit_wei()?;
        let pending = proxy.deposit(value).await?;
        self.complete(pending, state).await
    }

    async fn try_withdraw(
        &self,
        connector: &ChainConnector,
        state: &ViewState,
    ) -> Result<(Receipt, ViewState), LockError> {
        let proxy = self.signing_proxy(connector).await?;
        let pending = proxy.withdraw().await?;
        self.complete(pending, state).await
    }

    async fn signing_proxy(
        &self,
        connector: &ChainConnector,
    ) -> Result<LockProxy<Signing>, LockError> {
        let account = self.gate.authorize(connector).await?;
        Ok(LockProxy::new(self.binding.clone(), connector.clone())
            .with_signer(connector.signer(account)))
    }

    /// Waits for `pending`, then clears the inputs and refreshes the balance.
    async fn complete(
        &self,
        mut pending: PendingTransaction,
        state: &ViewState,
    ) -> Result<(Receipt, ViewState), LockError> {
        info!(target: "lock::tx", tx = %pending, "transaction sent, awaiting confirmation");
        let receipt = pending.resolve().await?;

        let cleared = state.with_cleared_inputs();
        let state = match self.sync.refresh(&cleared).await {
            Ok(state) => state,
            Err(err) => {
                warn!(target: "lock::sync", %err, "failed to refresh balance");
                cleared
            }
        };
        Ok((receipt, state))
    }
}

fn skipped(reason: SkipReason) -> FlowOutcome {
    debug!(target: "lock::tx", %reason, "flow skipped");
    FlowOutcome::Skipped(reason)
}
