//! # Fixture Parameters
//!
//! The literals every suite compares against, plus where the proof comes
//! from. Deserialised from the `[fixture]` table of the harness config.

use crate::error::FixtureError;
use serde::{Deserialize, Serialize};
use shared_types::{ProofFile, TokenId, U256};
use std::path::PathBuf;

/// Proof generated for the square circuit with public input `[9, 1]`.
const SAMPLE_PROOF: &str = include_str!("../data/proof.json");

/// Literal parameters of a suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureParams {
    /// Expected `name()`.
    pub name: String,
    /// Expected `symbol()`.
    pub symbol: String,
    /// Expected `baseTokenURI()`; token URIs append the decimal id.
    pub base_token_uri: String,
    /// First id minted by the ERC-721 suite.
    pub first_token_id: u64,
    /// Last id minted by the ERC-721 suite (inclusive).
    pub last_token_id: u64,
    /// ZoKrates `proof.json`; the bundled sample proof when unset.
    pub proof_file: Option<PathBuf>,
}

impl Default for FixtureParams {
    fn default() -> Self {
        Self {
            name: "MyToken".to_string(),
            symbol: "MTK".to_string(),
            base_token_uri: "https://s3-us-west-2.amazonaws.com/udacity-blockchain/capstone/"
                .to_string(),
            first_token_id: 1,
            last_token_id: 10,
            proof_file: None,
        }
    }
}

impl FixtureParams {
    /// Check the token range and metadata literals.
    pub fn validate(&self) -> Result<(), FixtureError> {
        if self.first_token_id > self.last_token_id {
            return Err(FixtureError::InvalidParams(format!(
                "first_token_id {} is greater than last_token_id {}",
                self.first_token_id, self.last_token_id
            )));
        }
        if self.last_token_id == u64::MAX {
            // The suites mint last + 1
            return Err(FixtureError::InvalidParams(
                "last_token_id leaves no room for the unauthorized mint id".into(),
            ));
        }
        if self.name.is_empty() || self.symbol.is_empty() {
            return Err(FixtureError::InvalidParams(
                "name and symbol must not be empty".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn first_token_id(&self) -> TokenId {
        U256::from(self.first_token_id)
    }

    #[must_use]
    pub fn last_token_id(&self) -> TokenId {
        U256::from(self.last_token_id)
    }

    /// Read the proof material.
    pub fn load_proof(&self) -> Result<ProofFile, FixtureError> {
        match &self.proof_file {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| FixtureError::ProofFile {
                    path: path.clone(),
                    source,
                })?;
                ProofFile::from_json(&json).map_err(|source| FixtureError::ProofFormat {
                    origin: path.display().to_string(),
                    source,
                })
            }
            None => ProofFile::from_json(SAMPLE_PROOF).map_err(|source| FixtureError::ProofFormat {
                origin: "bundled sample proof".to_string(),
                source,
            }),
        }
    }
}
