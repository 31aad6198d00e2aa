//! # CH-04 Fixture - Suite Setup
//!
//! Everything a suite needs before its first step: who the owner is, which
//! account plays the outsider, the contract handles, the metadata literals
//! and the proof material.
//!
//! | Provider | Contracts | Accounts |
//! |----------|-----------|----------|
//! | [`RpcFixtureProvider`] | deployed addresses from config | node (`eth_accounts`) or HD wallet |
//! | [`InMemoryFixtureProvider`] | fresh in-memory deployments | caller-supplied |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod fixture;
pub mod params;
pub mod provider;

pub use error::FixtureError;
pub use fixture::TestFixture;
pub use params::FixtureParams;
pub use provider::{
    ContractAddresses, FixtureProvider, InMemoryFixtureProvider, RpcFixtureProvider, DEV_MNEMONIC,
    REQUIRED_ACCOUNTS,
};
