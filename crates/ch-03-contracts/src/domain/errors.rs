//! # Domain Errors

use ch_01_abi::AbiError;
use ch_02_rpc_client::RpcError;
use shared_bus::SubscriptionError;
use shared_types::TxHash;
use thiserror::Error;

/// A `require` failure inside the contract, carrying its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Revert(pub &'static str);

/// Revert messages used by the deed contracts.
pub mod reasons {
    pub const NOT_OWNER: &str = "Caller is not contract owner";
    pub const PAUSED: &str = "Contract is paused";
    pub const NOT_PAUSED: &str = "Contract is not paused";
    pub const INVALID_ADDRESS: &str = "Invalid address";
    pub const ALREADY_MINTED: &str = "Token already minted";
    pub const NONEXISTENT_TOKEN: &str = "Token does not exist";
    pub const APPROVAL_TO_OWNER: &str = "Approval to current owner";
    pub const NOT_APPROVED: &str = "Caller is not token owner or approved";
    pub const WRONG_FROM: &str = "Transfer of token that is not own";
    pub const INVALID_PROOF: &str = "Solution is not valid";
    pub const SOLUTION_EXISTS: &str = "Solution already exists";
}

/// Errors from contract calls.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The call or transaction reverted.
    #[error("Transaction reverted: {}", reason.as_deref().unwrap_or("<no reason>"))]
    Reverted {
        reason: Option<String>,
        tx_hash: Option<TxHash>,
    },

    /// Transport or node failure.
    #[error("RPC error: {0}")]
    Rpc(RpcError),

    /// The contract returned data that does not decode.
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// An awaited event did not arrive.
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
}

impl ContractError {
    /// Revert reason when this error is a revert.
    #[must_use]
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// True if the contract rejected the call (as opposed to a transport failure).
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}

impl From<RpcError> for ContractError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Reverted { reason } => Self::Reverted {
                reason,
                tx_hash: None,
            },
            other => Self::Rpc(other),
        }
    }
}

impl From<Revert> for ContractError {
    fn from(revert: Revert) -> Self {
        Self::Reverted {
            reason: Some(revert.0.to_string()),
            tx_hash: None,
        }
    }
}
