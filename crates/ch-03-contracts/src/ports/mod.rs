//! # Ports Layer
//!
//! - **Inbound**: contract handles driven by the scenarios
//! - **Outbound**: proof checking behind the in-memory verifier

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
