//! The shared fixture one suite runs against.

use ch_03_contracts::{Erc721Mintable, SquareVerifierToken};
use shared_types::{Address, Proof, PublicInput, TokenId, U256};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Accounts, contract handles and literals of one suite run.
///
/// Built once per suite and not modified afterwards; the contracts behind
/// the handles do change as steps run.
#[derive(Clone)]
pub struct TestFixture {
    /// Contract owner, `accounts[0]`.
    pub owner: Address,
    /// Same account as `owner`.
    pub account_one: Address,
    /// `accounts[1]`; never owns the contracts.
    pub account_two: Address,

    pub name: String,
    pub symbol: String,
    pub base_token_uri: String,
    pub first_token_id: TokenId,
    pub last_token_id: TokenId,

    pub proof: Proof,
    pub input: PublicInput,

    /// The `ERC721Mintable` deployment.
    pub my_token: Arc<dyn Erc721Mintable>,
    /// The `SolnSquareVerifier` deployment.
    pub soln_square_verifier: Arc<dyn SquareVerifierToken>,
}

impl TestFixture {
    /// Number of ids in `[first_token_id, last_token_id]`.
    #[must_use]
    pub fn token_count(&self) -> U256 {
        self.last_token_id - self.first_token_id + U256::one()
    }

    /// Ids the ERC-721 suite mints, in order.
    pub fn token_ids(&self) -> impl Iterator<Item = TokenId> {
        let first = self.first_token_id;
        let count = self.token_count().low_u64();
        (0..count).map(move |offset| first + U256::from(offset))
    }

    /// Expected `tokenURI` of `token_id`.
    #[must_use]
    pub fn expected_token_uri(&self, token_id: TokenId) -> String {
        format!("{}{}", self.base_token_uri, token_id)
    }

    /// Log who is who before a suite starts.
    pub fn log_summary(&self) {
        info!(
            owner = ?self.owner,
            account_one = ?self.account_one,
            account_two = ?self.account_two,
            "Fixture accounts"
        );
        info!(
            name = %self.name,
            symbol = %self.symbol,
            base_token_uri = %self.base_token_uri,
            first_token_id = %self.first_token_id,
            last_token_id = %self.last_token_id,
            "Fixture metadata"
        );
        info!(
            my_token = ?self.my_token.address(),
            soln_square_verifier = ?self.soln_square_verifier.address(),
            "Fixture contracts"
        );
    }
}

impl fmt::Debug for TestFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestFixture")
            .field("owner", &self.owner)
            .field("account_two", &self.account_two)
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("base_token_uri", &self.base_token_uri)
            .field("first_token_id", &self.first_token_id)
            .field("last_token_id", &self.last_token_id)
            .field("my_token", &self.my_token.address())
            .field("soln_square_verifier", &self.soln_square_verifier.address())
            .finish_non_exhaustive()
    }
}
