//! # Domain Layer
//!
//! Contract-call errors and the ledger behind the in-memory contract.

pub mod errors;
pub mod ledger;

pub use errors::{reasons, ContractError, Revert};
pub use ledger::{DeedLedger, DeedMetadata, Solution};
