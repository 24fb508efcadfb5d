use crate::{
    connector::ChainConnector,
    contract::{LockBinding, LockProxy},
    error::LockError,
    state::ViewState,
};

/// Mirrors the contract's balance into the [`ViewState`].
#[derive(Clone, Debug)]
pub struct StateSynchronizer {
    binding: LockBinding,
    connector: Option<ChainConnector>,
}

impl StateSynchronizer {
    pub fn new(binding: LockBinding, connector: Option<ChainConnector>) -> Self {
        Self { binding, connector }
    }

    /// Reads the contract balance and returns `state` with the held amount replaced.
    ///
    /// Without a wallet this is a no-op returning `state` unchanged.
    pub async fn refresh(&self, state: &ViewState) -> Result<ViewState, LockError> {
        let Some(connector) = &self.connector else {
            trace!(target: "lock::sync", "no wallet, skipping refresh");
            return Ok(state.clone());
        };

        let proxy = LockProxy::new(self.binding.clone(), connector.clone());
        let balance = proxy.balance().await?;
        let state = state.with_held_amount(balance);
        debug!(target: "lock::sync", %balance, held = %state.held_amount, "refreshed balance");
        Ok(state)
    }
}
