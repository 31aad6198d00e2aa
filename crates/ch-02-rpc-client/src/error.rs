//! Errors for the JSON-RPC transport and the local wallet.

use shared_types::Address;
use thiserror::Error;

/// Errors that can occur when talking to an Ethereum node.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Execution reverted; `reason` is the `require` message when the node
    /// reported one.
    #[error("Execution reverted: {}", reason.as_deref().unwrap_or("<no reason>"))]
    Reverted { reason: Option<String> },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    #[error("Transaction request has no sender")]
    MissingSender,

    #[error("No local key for account {0:?}")]
    UnknownAccount(Address),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl RpcError {
    /// Revert reason, if this error is a revert.
    #[must_use]
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason } => reason.as_deref(),
            _ => None,
        }
    }

    /// True for [`RpcError::Reverted`].
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}

/// Errors deriving or using HD wallet keys.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Mnemonic must have 12, 15, 18, 21 or 24 words, got {0}")]
    InvalidWordCount(usize),

    #[error("Derived key is not a valid secp256k1 scalar (path {path})")]
    InvalidDerivation { path: String },

    #[error("Wallet must derive at least one account")]
    NoAccounts,

    #[error("Signing failed: {0}")]
    Signing(String),
}
