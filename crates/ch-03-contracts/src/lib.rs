//! # CH-03 Contracts - Deed Contract Handles
//!
//! The harness never touches contract storage; it drives `ERC721Mintable`
//! and `SolnSquareVerifier` through the handle traits in [`ports`].
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): `ContractError`, revert reasons, and the
//!   `DeedLedger` state machine behind the in-memory contract
//! - **Ports Layer** (`ports/`): `Erc721Mintable`, `SquareVerifierToken`,
//!   `ProofCheck`
//! - **Adapters Layer** (`adapters/`): `RpcContract` (JSON-RPC) and
//!   `InMemoryToken` (test double)
//!
//! ## Events
//!
//! Each handle owns an event bus. Adapters publish the decoded events of
//! every successful transaction, in log order, before the transaction
//! call returns; reverted transactions publish nothing.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{solution_key, InMemoryToken, ReceiptPolicy, RpcContract};
pub use domain::{reasons, ContractError, DeedLedger, DeedMetadata, Revert};
pub use ports::{AcceptAll, Erc721Mintable, ProofCheck, SquareVerifierToken};
