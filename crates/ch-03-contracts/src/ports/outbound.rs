//! # Outbound Ports
//!
//! SPIs the in-memory contract depends on.

use shared_types::{Proof, PublicInput};

/// Stand-in for the on-chain pairing check of the square verifier.
pub trait ProofCheck: Send + Sync {
    /// True if `proof` verifies for `input`.
    fn verify(&self, proof: &Proof, input: &PublicInput) -> bool;
}

/// Accepts every proof.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ProofCheck for AcceptAll {
    fn verify(&self, _proof: &Proof, _input: &PublicInput) -> bool {
        true
    }
}

impl<F> ProofCheck for F
where
    F: Fn(&Proof, &PublicInput) -> bool + Send + Sync,
{
    fn verify(&self, proof: &Proof, input: &PublicInput) -> bool {
        self(proof, input)
    }
}
