//! # Fixture Providers
//!
//! `config(accounts)` binds accounts to contract handles and loads the
//! literals. It runs once before a suite's first step.

use crate::error::FixtureError;
use crate::fixture::TestFixture;
use crate::params::FixtureParams;
use async_trait::async_trait;
use ch_02_rpc_client::{BlockTag, HdWallet, RpcClient, Signer};
use ch_03_contracts::{
    AcceptAll, DeedMetadata, InMemoryToken, ProofCheck, ReceiptPolicy, RpcContract,
};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::sync::Arc;
use tracing::{debug, info};

/// Mnemonic of the well-known development accounts (ganache, hardhat, anvil).
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Accounts a fixture needs: the owner and one outsider.
pub const REQUIRED_ACCOUNTS: usize = 2;

/// Builds the fixture for a suite.
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Bind `accounts` (owner first) to the contracts.
    async fn config(&self, accounts: &[Address]) -> Result<TestFixture, FixtureError>;
}

fn check_accounts(accounts: &[Address]) -> Result<(Address, Address), FixtureError> {
    match accounts {
        [owner, second, ..] => Ok((*owner, *second)),
        _ => Err(FixtureError::NotEnoughAccounts {
            needed: REQUIRED_ACCOUNTS,
            found: accounts.len(),
        }),
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Deploys fresh in-memory contracts for every `config` call.
pub struct InMemoryFixtureProvider {
    params: FixtureParams,
    proof_check: Arc<dyn ProofCheck>,
}

impl InMemoryFixtureProvider {
    #[must_use]
    pub fn new(params: FixtureParams) -> Self {
        Self {
            params,
            proof_check: Arc::new(AcceptAll),
        }
    }

    /// Verify proofs with `check` instead of accepting all of them.
    #[must_use]
    pub fn with_proof_check(mut self, check: Arc<dyn ProofCheck>) -> Self {
        self.proof_check = check;
        self
    }

    /// The first `count` development accounts.
    pub fn dev_accounts(count: usize) -> Result<Vec<Address>, FixtureError> {
        Ok(HdWallet::from_mnemonic(DEV_MNEMONIC, count)?.addresses())
    }

    fn metadata(&self) -> DeedMetadata {
        DeedMetadata {
            name: self.params.name.clone(),
            symbol: self.params.symbol.clone(),
            base_token_uri: self.params.base_token_uri.clone(),
        }
    }
}

#[async_trait]
impl FixtureProvider for InMemoryFixtureProvider {
    async fn config(&self, accounts: &[Address]) -> Result<TestFixture, FixtureError> {
        let (owner, account_two) = check_accounts(accounts)?;
        self.params.validate()?;
        let proof_file = self.params.load_proof()?;

        let my_token = Arc::new(InMemoryToken::deploy(owner, self.metadata()));
        let soln_square_verifier = Arc::new(
            InMemoryToken::deploy(owner, self.metadata())
                .with_proof_check(Arc::clone(&self.proof_check)),
        );

        let fixture = TestFixture {
            owner,
            account_one: owner,
            account_two,
            name: self.params.name.clone(),
            symbol: self.params.symbol.clone(),
            base_token_uri: self.params.base_token_uri.clone(),
            first_token_id: self.params.first_token_id(),
            last_token_id: self.params.last_token_id(),
            proof: proof_file.proof,
            input: proof_file.input,
            my_token,
            soln_square_verifier,
        };
        fixture.log_summary();
        Ok(fixture)
    }
}

// =============================================================================
// JSON-RPC
// =============================================================================

/// Addresses of the deployed contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractAddresses {
    /// `ERC721Mintable` deployment.
    pub my_token: Option<Address>,
    /// `SolnSquareVerifier` deployment.
    pub soln_square_verifier: Option<Address>,
}

/// Binds already-deployed contracts over JSON-RPC.
pub struct RpcFixtureProvider {
    client: Arc<RpcClient>,
    signer: Signer,
    params: FixtureParams,
    contracts: ContractAddresses,
    receipts: ReceiptPolicy,
}

impl RpcFixtureProvider {
    #[must_use]
    pub fn new(
        client: Arc<RpcClient>,
        signer: Signer,
        params: FixtureParams,
        contracts: ContractAddresses,
        receipts: ReceiptPolicy,
    ) -> Self {
        Self {
            client,
            signer,
            params,
            contracts,
            receipts,
        }
    }

    /// Accounts to run as: the wallet's when signing locally, otherwise
    /// the node's unlocked accounts.
    pub async fn accounts(&self) -> Result<Vec<Address>, FixtureError> {
        match self.signer.local_accounts() {
            Some(accounts) => Ok(accounts),
            None => Ok(self.client.accounts().await?),
        }
    }

    async fn bind(&self, contract: &'static str, address: Option<Address>) -> Result<RpcContract, FixtureError> {
        let address = address.ok_or(FixtureError::UnboundContract {
            contract,
            reason: "no address configured".to_string(),
        })?;

        let code = self.client.code(&address, BlockTag::Latest).await?;
        if code.is_empty() {
            return Err(FixtureError::UnboundContract {
                contract,
                reason: format!("no code at {address:?}"),
            });
        }
        debug!(contract, address = ?address, code_len = code.len(), "Contract bound");

        Ok(RpcContract::new(
            address,
            Arc::clone(&self.client),
            self.signer.clone(),
            self.receipts,
        ))
    }
}

#[async_trait]
impl FixtureProvider for RpcFixtureProvider {
    async fn config(&self, accounts: &[Address]) -> Result<TestFixture, FixtureError> {
        let (owner, account_two) = check_accounts(accounts)?;
        self.params.validate()?;
        let proof_file = self.params.load_proof()?;

        let my_token = self.bind("ERC721Mintable", self.contracts.my_token).await?;
        let soln_square_verifier = self
            .bind("SolnSquareVerifier", self.contracts.soln_square_verifier)
            .await?;
        info!(endpoint = self.client.endpoint(), "Contracts bound over JSON-RPC");

        let fixture = TestFixture {
            owner,
            account_one: owner,
            account_two,
            name: self.params.name.clone(),
            symbol: self.params.symbol.clone(),
            base_token_uri: self.params.base_token_uri.clone(),
            first_token_id: self.params.first_token_id(),
            last_token_id: self.params.last_token_id(),
            proof: proof_file.proof,
            input: proof_file.input,
            my_token: Arc::new(my_token),
            soln_square_verifier: Arc::new(soln_square_verifier),
        };
        fixture.log_summary();
        Ok(fixture)
    }
}
