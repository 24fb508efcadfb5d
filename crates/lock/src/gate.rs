use crate::{connector::ChainConnector, error::LockError};
use alloy_primitives::Address;
use parking_lot::Mutex;

/// Obtains and caches the user's account authorization.
#[derive(Debug, Default)]
pub struct WalletGate {
    /// Account to pick when the wallet exposes several.
    preferred: Option<Address>,
    /// The account granted by the last successful authorization.
    authorized: Mutex<Option<Address>>,
}

impl WalletGate {
    pub fn new(preferred: Option<Address>) -> Self {
        Self { preferred, authorized: Mutex::new(None) }
    }

    /// Returns the authorized account, if any.
    pub fn account(&self) -> Option<Address> {
        *self.authorized.lock()
    }

    /// Whether the wallet has already granted access.
    pub fn is_authorized(&self) -> bool {
        self.authorized.lock().is_some()
    }

    /// Requests account access from the wallet.
    ///
    /// No-op once an account has been granted.
    pub async fn authorize(&self, connector: &ChainConnector) -> Result<Address, LockError> {
        if let Some(account) = self.account() {
            trace!(target: "lock::gate", %account, "already authorized");
            return Ok(account);
        }

        debug!(target: "lock::gate", "requesting accounts");
        let accounts = connector
            .request_accounts()
            .await
            .map_err(|err| LockError::AuthorizationDenied(err.to_string()))?;

        let account = match self.preferred {
            Some(preferred) if accounts.contains(&preferred) => preferred,
            Some(preferred) => {
                return Err(LockError::AuthorizationDenied(format!(
                    "account {preferred} was not granted"
                )));
            }
            None => *accounts
                .first()
                .ok_or_else(|| LockError::AuthorizationDenied("no accounts granted".to_string()))?,
        };

        *self.authorized.lock() = Some(account);
        info!(target: "lock::gate", %account, "authorized");
        Ok(account)
    }

    /// Forgets the cached authorization.
    pub fn reset(&self) {
        self.authorized.lock().take();
    }
}
