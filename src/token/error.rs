//! Failure kinds surfaced by token operations.

use thiserror::Error;

use crate::blockchain::{BlockchainError, ChainId};

/// Every way a balance read or a transaction can fail, as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Missing or malformed recipient/amount; caught before any network call.
    #[error("{0}")]
    InvalidInput(String),

    /// No active account or no signer available.
    #[error("Please connect your wallet")]
    NoWalletConnected,

    /// Wallet is attached to a network other than the supported one.
    #[error("Please switch to {network}")]
    NetworkMismatch {
        network: String,
        expected: ChainId,
        actual: Option<ChainId>,
    },

    /// Read path failed (unreachable network, revert, malformed response).
    #[error("Failed to fetch balance: {0}")]
    BalanceFetchFailed(String),

    /// Submission or confirmation failed.
    #[error("{0}")]
    TransactionFailed(String),

    /// A mutating operation is already in flight.
    #[error("Another transaction is still pending")]
    Busy,
}

impl TokenError {
    /// Whether the failure was raised by local checks, before reaching the
    /// contract.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TokenError::InvalidInput(_)
                | TokenError::NoWalletConnected
                | TokenError::NetworkMismatch { .. }
                | TokenError::Busy
        )
    }

    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::InvalidInput(_) => "invalid_input",
            TokenError::NoWalletConnected => "no_wallet",
            TokenError::NetworkMismatch { .. } => "network_mismatch",
            TokenError::BalanceFetchFailed(_) => "balance_fetch_failed",
            TokenError::TransactionFailed(_) => "transaction_failed",
            TokenError::Busy => "busy",
        }
    }

    pub(crate) fn transaction(err: BlockchainError) -> Self {
        TokenError::TransactionFailed(err.to_string())
    }

    pub(crate) fn balance(err: BlockchainError) -> Self {
        TokenError::BalanceFetchFailed(err.to_string())
    }
}
