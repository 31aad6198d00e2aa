//! # Shared Types Crate
//!
//! Domain entities used across the deed harness.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   (addresses, token ids, proofs, decoded events) is defined here.
//! - **Ethereum-native primitives**: `U256`, `H160` and `H256` come from
//!   `primitive-types` and serialize as `0x`-prefixed hex, matching JSON-RPC.

pub mod entities;
pub mod errors;
pub mod proof;

pub use entities::*;
pub use errors::*;
pub use proof::*;
