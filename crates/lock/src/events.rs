//! Live `FallbackCalled` notifications.

use crate::{
    connector::ChainConnector,
    contract::{FallbackCalled, LockBinding, LockProxy},
    error::LockError,
    gate::WalletGate,
    state::display_ether,
    wallet::LogStream,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use futures::StreamExt;
use parking_lot::Mutex;
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::task::JoinHandle;

/// A decoded `FallbackCalled(caller, value)` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FallbackEvent {
    pub caller: Address,
    /// Value in wei.
    pub value: U256,
}

impl From<FallbackCalled> for FallbackEvent {
    fn from(event: FallbackCalled) -> Self {
        Self { caller: event.caller, value: event.value }
    }
}

impl fmt::Display for FallbackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sent {} ETH", self.caller, display_ether(self.value))
    }
}

/// Callback invoked for every received event.
pub type Listener = Arc<dyn Fn(FallbackEvent) + Send + Sync>;

/// The default listener: writes the event to the log.
pub fn log_fallback_called(event: FallbackEvent) {
    info!(
        target: "lock::events",
        caller = %event.caller,
        value = %format_args!("{} ETH", display_ether(event.value)),
        "FallbackCalled event received"
    );
}

/// Identifier of a subscription handed out by [`EventListenerManager`].
pub type SubscriptionId = u64;

/// A live subscription. Dropping it detaches the listener.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether the underlying log stream is still being consumed.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// State of an [`EventListenerManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Unsubscribed,
    Subscribed(SubscriptionId),
}

/// Owns the session's single event subscription.
///
/// [`subscribe`](Self::subscribe) releases the previous subscription before installing a new
/// one, so at most one listener receives each event. A failed re-subscription keeps the previous
/// listener.
#[derive(Debug)]
pub struct EventListenerManager {
    binding: LockBinding,
    connector: Option<ChainConnector>,
    gate: Arc<WalletGate>,
    active: Mutex<Option<Subscription>>,
    next_id: AtomicU64,
}

impl EventListenerManager {
    pub fn new(
        binding: LockBinding,
        connector: Option<ChainConnector>,
        gate: Arc<WalletGate>,
    ) -> Self {
        Self { binding, connector, gate, active: Mutex::new(None), next_id: AtomicU64::new(1) }
    }

    pub fn state(&self) -> ListenerState {
        match &*self.active.lock() {
            Some(sub) => ListenerState::Subscribed(sub.id()),
            None => ListenerState::Unsubscribed,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Subscribes the logging listener.
    pub async fn subscribe(&self) -> Result<SubscriptionId, LockError> {
        self.subscribe_with(Arc::new(log_fallback_called)).await
    }

    /// Subscribes `listener` to `FallbackCalled`, replacing any existing subscription.
    pub async fn subscribe_with(&self, listener: Listener) -> Result<SubscriptionId, LockError> {
        let connector = self.connector.as_ref().ok_or(LockError::WalletUnavailable)?;

        // the current listener stays attached until the new log stream is open
        self.gate.authorize(connector).await?;

        let proxy = LockProxy::new(self.binding.clone(), connector.clone());
        let logs = proxy.fallback_called_logs().await?;

        self.unsubscribe();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(listen(id, logs, listener));

        // a concurrent `subscribe` may have installed one in the meantime
        if let Some(prev) = self.active.lock().replace(Subscription { id, task }) {
            debug!(target: "lock::events", id = prev.id(), "replacing concurrent subscription");
        }
        debug!(target: "lock::events", id, address = %self.binding.address(), "subscribed");
        Ok(id)
    }

    /// Detaches the current listener. Returns `false` if there was none.
    pub fn unsubscribe(&self) -> bool {
        match self.active.lock().take() {
            Some(sub) => {
                debug!(target: "lock::events", id = sub.id(), "unsubscribed");
                true
            }
            None => false,
        }
    }
}

impl Drop for EventListenerManager {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

async fn listen(id: SubscriptionId, mut logs: LogStream, listener: Listener) {
    while let Some(log) = logs.next().await {
        let event = match FallbackCalled::decode_log_data(&log.data) {
            Ok(event) => FallbackEvent::from(event),
            Err(err) => {
                warn!(target: "lock::events", id, %err, "failed to decode FallbackCalled log");
                continue;
            }
        };
        trace!(target: "lock::events", id, ?event, "dispatching event");
        if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
            error!(target: "lock::events", id, "event listener panicked");
        }
    }
    debug!(target: "lock::events", id, "log stream closed");
}
