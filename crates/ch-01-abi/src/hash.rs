//! # Hashing
//!
//! keccak256 and the selectors/topics derived from it.

use sha3::{Digest, Keccak256};
use shared_types::H256;

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// Function selector: first 4 bytes of `keccak256(signature)`.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&hash.as_bytes()[..4]);
    sel
}

/// Event topic 0: `keccak256(signature)`.
#[must_use]
pub fn event_topic(signature: &str) -> H256 {
    keccak256(signature.as_bytes())
}
