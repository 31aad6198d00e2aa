//! # Adapters Layer
//!
//! - `rpc`: deployed contracts over JSON-RPC
//! - `in_memory`: in-process contract for running the scenarios without a node

pub mod in_memory;
pub mod rpc;

pub use in_memory::{solution_key, InMemoryToken};
pub use rpc::{ReceiptPolicy, RpcContract};
