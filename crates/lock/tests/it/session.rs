use crate::utils::*;
use lock_dapp::{LockError, LockInfo, LockSession};
use similar_asserts::assert_eq;

#[tokio::test(flavor = "multi_thread")]
async fn authorization_is_requested_once() {
    let wallet = mock().with_unlock_time(0);
    let session = session(&wallet);

    session.set_deposit_input("0.1");
    assert!(session.deposit().await.is_confirmed());
    session.set_deposit_input("0.2");
    assert!(session.deposit().await.is_confirmed());
    assert!(session.withdraw().await.is_confirmed());

    assert_eq!(wallet.account_requests(), 1);
    assert_eq!(session.gate().account(), Some(OWNER));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_preferred_sender_is_denied() {
    let wallet = mock();
    let session = session_as(&wallet, ALICE);
    session.set_deposit_input("0.1");

    let outcome = session.deposit().await;
    assert!(matches!(outcome.error(), Some(LockError::AuthorizationDenied(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_account_list_is_denied() {
    let wallet = mock().with_accounts(Vec::new());
    let session = session(&wallet);
    session.set_deposit_input("0.1");

    let outcome = session.deposit().await;
    assert!(matches!(outcome.error(), Some(LockError::AuthorizationDenied(_))));
    assert!(wallet.submitted().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reports_lock_info() {
    let wallet = mock().with_unlock_time(1_800_000_000).with_contract_balance(ether("0.75"));
    let info = session(&wallet).info().await.unwrap();
    assert_eq!(
        info,
        LockInfo {
            address: LOCK,
            owner: OWNER,
            unlock_time: alloy_primitives::U256::from(1_800_000_000u64),
            balance: ether("0.75"),
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn info_requires_wallet() {
    let session = LockSession::new(LOCK, None);
    assert!(!session.has_wallet());
    assert!(matches!(session.info().await, Err(LockError::WalletUnavailable)));
}

#[tokio::test(flavor = "multi_thread")]
async fn inputs_survive_refresh() {
    let wallet = mock().with_contract_balance(ether("1"));
    let session = session(&wallet);
    session.set_deposit_input("0.3");
    session.set_unlock_time_input("123");

    let view = session.refresh().await;
    assert_eq!(view.held_amount, "1.0");
    assert_eq!(view.deposit_input, "0.3");
    assert_eq!(view.unlock_time_input, "123");
}
