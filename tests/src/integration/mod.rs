//! Cross-crate tests.

pub mod failure_injection;
pub mod rpc_backend;
pub mod suites;
