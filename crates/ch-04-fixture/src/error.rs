//! Fixture construction errors.

use ch_02_rpc_client::{RpcError, WalletError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Need at least {needed} accounts, found {found}")]
    NotEnoughAccounts { needed: usize, found: usize },

    #[error("Cannot bind {contract}: {reason}")]
    UnboundContract {
        contract: &'static str,
        reason: String,
    },

    #[error("Cannot read proof file {}: {source}", path.display())]
    ProofFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed proof material in {origin}: {source}")]
    ProofFormat {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid fixture parameters: {0}")]
    InvalidParams(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}
