use crate::utils::*;
use lock_dapp::{ChainConnector, LockBinding, LockProxy, StateSynchronizer, ViewState};
use similar_asserts::assert_eq;

#[tokio::test(flavor = "multi_thread")]
async fn refresh_is_idempotent() {
    let wallet = mock().with_contract_balance(ether("3.25"));
    let sync = StateSynchronizer::new(
        LockBinding::new(LOCK),
        Some(ChainConnector::from_wallet(wallet.clone())),
    );

    let state = ViewState::default().with_deposit_input("1");
    let first = sync.refresh(&state).await.unwrap();
    let second = sync.refresh(&first).await.unwrap();
    assert_eq!(first.held_amount, "3.25");
    assert_eq!(first, second);
    assert_eq!(first.deposit_input, "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_without_wallet_returns_input() {
    let sync = StateSynchronizer::new(LockBinding::new(LOCK), None);
    let state = ViewState::default().with_unlock_time_input("42");
    assert_eq!(sync.refresh(&state).await.unwrap(), state);
}

#[tokio::test(flavor = "multi_thread")]
async fn proxy_reads_contract_parameters() {
    let wallet = mock().with_unlock_time(1_800_000_000).with_contract_balance(ether("1"));
    let proxy = LockProxy::new(LockBinding::new(LOCK), ChainConnector::from_wallet(wallet));

    assert_eq!(proxy.owner().await.unwrap(), OWNER);
    assert_eq!(proxy.unlock_time().await.unwrap(), alloy_primitives::U256::from(1_800_000_000u64));
    assert_eq!(proxy.balance().await.unwrap(), ether("1"));
}
