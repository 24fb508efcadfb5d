use alloy_primitives::{Address, U256, address, utils::parse_ether};
use lock_dapp::{InjectedWallet, LockSession};
use lock_test_utils::MockWallet;
use std::sync::Arc;

pub const LOCK: Address = address!("0xE6E340D132b5f46d1e472DebcD681B2aBc16e57E");
pub const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const ALICE: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}

pub fn mock() -> MockWallet {
    lock_test_utils::init_tracing();
    MockWallet::new(LOCK, OWNER)
}

pub fn session(wallet: &MockWallet) -> LockSession {
    let wallet: Arc<dyn InjectedWallet> = Arc::new(wallet.clone());
    LockSession::new(LOCK, Some(wallet))
}

pub fn session_as(wallet: &MockWallet, sender: Address) -> LockSession {
    let wallet: Arc<dyn InjectedWallet> = Arc::new(wallet.clone());
    LockSession::with_sender(LOCK, Some(wallet), Some(sender))
}
