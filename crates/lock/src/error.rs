use alloy_primitives::{TxHash, utils::UnitsError};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;

/// Errors raised by an injected wallet provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{operation} rejected by the wallet: {reason}")]
    Rejected { operation: &'static str, reason: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Pending(#[from] PendingTransactionError),
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Returns a rejection error for the given operation.
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected { operation, reason: reason.into() }
    }

    /// Returns an error with a free-form message.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Why an ether amount could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error("amount must not be negative")]
    Negative,
}

/// Failure kinds of the deposit, withdraw, refresh and subscribe flows.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("no injected wallet is available")]
    WalletUnavailable,
    #[error("account authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error("malformed amount {input:?}: {source}")]
    MalformedAmount {
        input: String,
        #[source]
        source: AmountError,
    },
    #[error("failed to submit transaction: {0}")]
    SubmissionFailure(#[source] ProviderError),
    #[error("transaction {0} reverted")]
    OnChainRevert(TxHash),
    #[error("no receipt available for transaction {0}")]
    ReceiptUnavailable(TxHash),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl LockError {
    /// Returns `true` if the error stems from a mined transaction with a failed status.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::OnChainRevert(_) | Self::ReceiptUnavailable(_))
    }
}
