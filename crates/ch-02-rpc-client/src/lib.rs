//! # CH-02 RPC Client - Ethereum JSON-RPC Transport
//!
//! Talks to the node the deed contracts are deployed on.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Client | `client.rs` | JSON-RPC 2.0 over HTTP, revert classification, receipt polling |
//! | Wire types | `types.rs` | Request/response envelopes, `CallRequest`, receipts |
//! | Wallet | `wallet.rs` | BIP-39/BIP-32 account derivation from a mnemonic |
//! | Signer | `signer.rs` | Node-managed or local EIP-155 signing |
//!
//! ## Networks
//!
//! - **development**: a local node (ganache) with unlocked accounts; the
//!   [`Signer::NodeManaged`] path.
//! - **public test network**: a hosted provider holding no keys; accounts come
//!   from an [`HdWallet`] and transactions go out raw via [`Signer::Local`].

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod error;
pub mod signer;
pub mod types;
pub mod wallet;

pub use client::RpcClient;
pub use error::{RpcError, WalletError};
pub use signer::{LegacyTransaction, Signer};
pub use types::{BlockTag, CallRequest, HexBytes, RpcLog, RpcReceipt};
pub use wallet::HdWallet;
