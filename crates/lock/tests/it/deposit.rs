use crate::utils::*;
use lock_dapp::{AmountError, FlowOutcome, LockError, LockSession, SkipReason, ViewState};
use similar_asserts::assert_eq;

#[tokio::test(flavor = "multi_thread")]
async fn deposit_raises_held_amount() {
    let wallet = mock().with_contract_balance(ether("1"));
    let session = session(&wallet);
    assert_eq!(session.refresh().await.held_amount, "1.0");

    session.set_unlock_time_input("123");
    session.set_deposit_input("0.5");
    let outcome = session.deposit().await;
    let FlowOutcome::Confirmed { receipt, state } = outcome else {
        panic!("deposit was not confirmed: {outcome:?}");
    };
    assert!(receipt.status);
    assert_eq!(state.held_amount, "1.5");
    assert_eq!(state.deposit_input, "");
    assert_eq!(state.unlock_time_input, "");
    assert_eq!(session.view(), state);
    assert_eq!(wallet.contract_balance(), ether("1.5"));

    let submitted = wallet.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].from, Some(OWNER));
    assert_eq!(submitted[0].value, Some(ether("0.5")));
}

#[tokio::test(flavor = "multi_thread")]
async fn deposit_without_wallet_is_noop() {
    let session = LockSession::new(LOCK, None);
    session.set_deposit_input("0.5");
    let before = session.view();

    let outcome = session.deposit().await;
    assert!(matches!(outcome, FlowOutcome::Skipped(SkipReason::WalletUnavailable)));
    assert_eq!(session.view(), before);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_deposit_is_skipped() {
    let wallet = mock();
    let session = session(&wallet);

    let outcome = session.deposit().await;
    assert!(matches!(outcome, FlowOutcome::Skipped(SkipReason::EmptyDeposit)));
    assert!(wallet.submitted().is_empty());
    assert_eq!(wallet.account_requests(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_amount_fails_before_submission() {
    let wallet = mock();
    let session = session(&wallet);
    session.set_deposit_input("half an ether");

    let outcome = session.deposit().await;
    assert!(
        matches!(outcome.error(), Some(LockError::MalformedAmount { input, .. }) if input == "half an ether")
    );
    assert!(wallet.submitted().is_empty());
    assert_eq!(session.view().deposit_input, "half an ether");
}

#[tokio::test(flavor = "multi_thread")]
async fn negative_amount_is_malformed() {
    let wallet = mock().with_contract_balance(ether("1"));
    let session = session(&wallet);
    session.set_deposit_input("-0.5");

    let outcome = session.deposit().await;
    let Some(LockError::MalformedAmount { input, source }) = outcome.error() else {
        panic!("negative amount was not rejected: {outcome:?}");
    };
    assert_eq!(input, "-0.5");
    assert!(matches!(source, AmountError::Negative));
    assert!(wallet.submitted().is_empty());
    assert_eq!(wallet.contract_balance(), ether("1"));
    assert_eq!(session.view().deposit_input, "-0.5");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_authorization_aborts_deposit() {
    let wallet = mock().reject_authorization("User rejected the request.");
    let session = session(&wallet);
    session.set_deposit_input("0.5");

    let outcome = session.deposit().await;
    assert!(matches!(outcome.error(), Some(LockError::AuthorizationDenied(_))));
    assert!(wallet.submitted().is_empty());
    assert!(!session.gate().is_authorized());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_transaction_is_submission_failure() {
    let wallet = mock().reject_transactions("User denied transaction signature.");
    let session = session(&wallet);
    session.set_deposit_input("0.5");

    let outcome = session.deposit().await;
    assert!(matches!(outcome.error(), Some(LockError::SubmissionFailure(_))));
    assert_eq!(session.view(), ViewState::default().with_deposit_input("0.5"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_receipt_fails() {
    let wallet = mock().without_receipts();
    let session = session(&wallet);
    session.set_deposit_input("0.25");

    let outcome = session.deposit().await;
    assert!(matches!(outcome.error(), Some(LockError::ReceiptUnavailable(_))));
    assert_eq!(session.view().deposit_input, "0.25");
}
