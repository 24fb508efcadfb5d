use crate::{
    connector::ChainConnector,
    contract::{LockBinding, LockProxy},
    error::LockError,
    events::{EventListenerManager, Listener, ListenerState, SubscriptionId},
    gate::WalletGate,
    orchestrator::{FlowOutcome, TransactionOrchestrator},
    state::ViewState,
    sync::StateSynchronizer,
    wallet::InjectedWallet,
};
use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use std::sync::Arc;

/// On-chain parameters of the Lock contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockInfo {
    pub address: Address,
    pub owner: Address,
    pub unlock_time: U256,
    pub balance: U256,
}

/// One user session against the Lock contract.
///
/// Flows may overlap; each one publishes its resulting view when it completes, so the last to
/// finish wins.
#[derive(Debug)]
pub struct LockSession {
    binding: LockBinding,
    connector: Option<ChainConnector>,
    gate: Arc<WalletGate>,
    sync: StateSynchronizer,
    events: EventListenerManager,
    orchestrator: TransactionOrchestrator,
    view: RwLock<ViewState>,
}

impl LockSession {
    /// Creates a session for the contract at `address`.
    ///
    /// `wallet` is `None` when the environment provides no wallet, in which case every flow is
    /// a no-op.
    pub fn new(address: Address, wallet: Option<Arc<dyn InjectedWallet>>) -> Self {
        Self::with_sender(address, wallet, None)
    }

    /// Like [`new`](Self::new), preferring `sender` among the accounts the wallet grants.
    pub fn with_sender(
        address: Address,
        wallet: Option<Arc<dyn InjectedWallet>>,
        sender: Option<Address>,
    ) -> Self {
        let binding = LockBinding::new(address);
        let connector = ChainConnector::new(wallet).ok();
        let gate = Arc::new(WalletGate::new(sender));
        let sync = StateSynchronizer::new(binding.clone(), connector.clone());
        let events = EventListenerManager::new(binding.clone(), connector.clone(), gate.clone());
        let orchestrator = TransactionOrchestrator::new(
            binding.clone(),
            connector.clone(),
            gate.clone(),
            sync.clone(),
        );
        Self {
            binding,
            connector,
            gate,
            sync,
            events,
            orchestrator,
            view: RwLock::new(ViewState::default()),
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.connector.is_some()
    }

    pub fn binding(&self) -> &LockBinding {
        &self.binding
    }

    pub fn gate(&self) -> &WalletGate {
        &self.gate
    }

    pub fn events(&self) -> &EventListenerManager {
        &self.events
    }

    /// Returns a snapshot of the current view.
    pub fn view(&self) -> ViewState {
        self.view.read().clone()
    }

    pub fn set_deposit_input(&self, input: impl Into<String>) {
        let mut view = self.view.write();
        *view = view.with_deposit_input(input);
    }

    pub fn set_unlock_time_input(&self, input: impl Into<String>) {
        let mut view = self.view.write();
        *view = view.with_unlock_time_input(input);
    }

    /// Loads the balance and starts listening for `FallbackCalled`.
    pub async fn mount(&self) -> ViewState {
        let view = self.refresh().await;
        if let Err(err) = self.events.subscribe().await {
            warn!(target: "lock::events", %err, "failed to subscribe to FallbackCalled");
        }
        view
    }

    /// Like [`mount`](Self::mount), delivering events to `listener`.
    pub async fn mount_with(&self, listener: Listener) -> ViewState {
        let view = self.refresh().await;
        if let Err(err) = self.events.subscribe_with(listener).await {
            warn!(target: "lock::events", %err, "failed to subscribe to FallbackCalled");
        }
        view
    }

    /// Releases the event subscription.
    pub fn teardown(&self) {
        self.events.unsubscribe();
    }

    pub fn listener_state(&self) -> ListenerState {
        self.events.state()
    }

    /// Re-subscribes to `FallbackCalled`, dropping the current listener first.
    pub async fn resubscribe(&self, listener: Listener) -> Result<SubscriptionId, LockError> {
        self.events.subscribe_with(listener).await
    }

    /// Refreshes the held amount from the chain. Failures are logged and leave the view as is.
    pub async fn refresh(&self) -> ViewState {
        let current = self.view();
        match self.sync.refresh(&current).await {
            Ok(view) => self.publish(view),
            Err(err) => {
                warn!(target: "lock::sync", %err, "failed to refresh balance");
                current
            }
        }
    }

    /// Runs the deposit flow for the current deposit input.
    pub async fn deposit(&self) -> FlowOutcome {
        let outcome = self.orchestrator.deposit(&self.view()).await;
        self.apply(outcome)
    }

    /// Runs the withdraw flow for the current unlock-time input.
    pub async fn withdraw(&self) -> FlowOutcome {
        let outcome = self.orchestrator.withdraw(&self.view()).await;
        self.apply(outcome)
    }

    /// Runs the withdraw flow as if the current time were `now`.
    pub async fn withdraw_at(&self, now: u64) -> FlowOutcome {
        let outcome = self.orchestrator.withdraw_at(&self.view(), now).await;
        self.apply(outcome)
    }

    /// Reads the contract's owner, unlock time and balance.
    pub async fn info(&self) -> Result<LockInfo, LockError> {
        let connector = self.connector.as_ref().ok_or(LockError::WalletUnavailable)?;
        let proxy = LockProxy::new(self.binding.clone(), connector.clone());
        Ok(LockInfo {
            address: proxy.address(),
            owner: proxy.owner().await?,
            unlock_time: proxy.unlock_time().await?,
            balance: proxy.balance().await?,
        })
    }

    fn apply(&self, outcome: FlowOutcome) -> FlowOutcome {
        if let Some(view) = outcome.state() {
            self.publish(view.clone());
        }
        outcome
    }

    fn publish(&self, view: ViewState) -> ViewState {
        *self.view.write() = view.clone();
        view
    }
}
