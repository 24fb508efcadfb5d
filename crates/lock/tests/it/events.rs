use crate::utils::*;
use lock_dapp::{FallbackEvent, ListenerState, LockError, LockSession};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn recorder() -> (Arc<Mutex<Vec<FallbackEvent>>>, lock_dapp::events::Listener) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    (events, Arc::new(move |event| sink.lock().push(event)))
}

#[tokio::test(flavor = "multi_thread")]
async fn delivers_fallback_called() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, listener) = recorder();

    session.mount_with(listener).await;
    assert!(matches!(session.listener_state(), ListenerState::Subscribed(_)));

    wallet.emit_fallback_called(ALICE, ether("0.1"));
    settle().await;
    assert_eq!(*events.lock(), vec![FallbackEvent { caller: ALICE, value: ether("0.1") }]);
}

#[tokio::test(flavor = "multi_thread")]
async fn deposit_triggers_event() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, listener) = recorder();
    session.mount_with(listener).await;

    session.set_deposit_input("0.5");
    assert!(session.deposit().await.is_confirmed());
    settle().await;

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].to_string(), format!("{OWNER} sent 0.5 ETH"));
}

#[tokio::test(flavor = "multi_thread")]
async fn resubscribing_keeps_single_listener() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, listener) = recorder();

    let first = session.resubscribe(listener.clone()).await.unwrap();
    let second = session.resubscribe(listener).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(session.listener_state(), ListenerState::Subscribed(second));

    settle().await;
    wallet.emit_fallback_called(ALICE, ether("1"));
    settle().await;
    assert_eq!(events.lock().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn teardown_detaches_listener() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, listener) = recorder();
    session.mount_with(listener).await;

    session.teardown();
    assert_eq!(session.listener_state(), ListenerState::Unsubscribed);
    assert!(!session.events().unsubscribe());

    settle().await;
    wallet.emit_fallback_called(ALICE, ether("1"));
    settle().await;
    assert!(events.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn undecodable_logs_are_skipped() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, listener) = recorder();
    session.mount_with(listener).await;

    wallet.emit_garbage();
    wallet.emit_fallback_called(ALICE, ether("0.2"));
    settle().await;
    assert_eq!(*events.lock(), vec![FallbackEvent { caller: ALICE, value: ether("0.2") }]);
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_listener_keeps_subscription() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, _) = recorder();
    let sink = events.clone();
    let listener: lock_dapp::events::Listener = Arc::new(move |event: FallbackEvent| {
        if event.value == ether("0.3") {
            panic!("listener failure");
        }
        sink.lock().push(event);
    });
    session.mount_with(listener).await;

    wallet.emit_fallback_called(ALICE, ether("0.3"));
    wallet.emit_fallback_called(ALICE, ether("0.4"));
    settle().await;
    assert_eq!(events.lock().len(), 1);
    assert!(session.events().is_subscribed());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_resubscribe_keeps_listener() {
    let wallet = mock();
    let session = session(&wallet);
    let (events, listener) = recorder();
    let id = session.resubscribe(listener.clone()).await.unwrap();

    wallet.fail_log_watch("filter not found");
    let err = session.resubscribe(listener).await.unwrap_err();
    assert!(matches!(err, LockError::Provider(_)));
    assert_eq!(session.listener_state(), ListenerState::Subscribed(id));

    wallet.emit_fallback_called(ALICE, ether("0.6"));
    settle().await;
    assert_eq!(*events.lock(), vec![FallbackEvent { caller: ALICE, value: ether("0.6") }]);
}

#[tokio::test(flavor = "multi_thread")]
async fn subscription_requires_authorization() {
    let wallet = mock().reject_authorization("denied");
    let session = session(&wallet);

    let err = session.resubscribe(recorder().1).await.unwrap_err();
    assert!(matches!(err, LockError::AuthorizationDenied(_)));
    assert_eq!(session.listener_state(), ListenerState::Unsubscribed);
}

#[tokio::test(flavor = "multi_thread")]
async fn mount_without_wallet_stays_unsubscribed() {
    let session = LockSession::new(LOCK, None);
    let view = session.mount().await;
    assert_eq!(view.held_amount, "0");
    assert_eq!(session.listener_state(), ListenerState::Unsubscribed);
}
