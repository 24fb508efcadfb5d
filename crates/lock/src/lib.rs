//! # lock-dapp
//!
//! Client for a time-locked escrow ("Lock") contract: deposit funds, withdraw them once the
//! unlock time has passed, and follow the contract's `FallbackCalled` notifications.
//!
//! ## Architecture
//!
//! - [`WalletGate`] obtains account authorization from the injected wallet
//! - [`ChainConnector`] wraps the [`InjectedWallet`] and hands out [`Signer`]s
//! - [`LockProxy`] binds the connector to the contract; only a signing proxy can `withdraw`
//! - [`StateSynchronizer`] mirrors the contract balance into the [`ViewState`]
//! - [`EventListenerManager`] owns the single event subscription
//! - [`TransactionOrchestrator`] drives the deposit and withdraw flows
//!
//! [`LockSession`] wires these together for one user session.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

// used by the `lock` binary
use clap as _;
use eyre as _;
use serde as _;
use tracing_subscriber as _;

pub mod connector;
pub mod contract;
pub mod error;
pub mod events;
pub mod gate;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod state;
pub mod sync;
pub mod wallet;

pub use connector::{ChainConnector, Signer};
pub use contract::{LockBinding, LockProxy, PendingTransaction};
pub use error::{AmountError, LockError, ProviderError};
pub use events::{EventListenerManager, FallbackEvent, ListenerState, Subscription};
pub use gate::WalletGate;
pub use orchestrator::{FlowOutcome, SkipReason, TransactionOrchestrator};
pub use provider::RpcWallet;
pub use session::{LockInfo, LockSession};
pub use state::ViewState;
pub use sync::StateSynchronizer;
pub use wallet::{InjectedWallet, LogStream, Receipt};
