//! # Inbound Ports (Contract Handles)
//!
//! What the scenarios call. Each handle is one deployed contract; queries
//! are free, transactions carry their sender in [`TxOptions`] and resolve
//! to the mined receipt.

use crate::domain::ContractError;
use async_trait::async_trait;
use shared_bus::{EventFilter, Subscription};
use shared_types::{Address, Proof, PublicInput, TokenId, TxOptions, TxReceipt, U256};

/// Handle to an `ERC721Mintable` deployment.
#[async_trait]
pub trait Erc721Mintable: Send + Sync {
    /// Deployed contract address.
    fn address(&self) -> Address;

    /// Subscribe to decoded events of this contract.
    ///
    /// Subscribe before sending the transaction whose events you await;
    /// events published earlier are not replayed.
    fn subscribe(&self, filter: EventFilter) -> Subscription;

    // Queries

    /// `isOwner()` as seen by `caller`.
    async fn is_owner(&self, caller: Address) -> Result<bool, ContractError>;

    async fn name(&self) -> Result<String, ContractError>;

    async fn symbol(&self) -> Result<String, ContractError>;

    async fn base_token_uri(&self) -> Result<String, ContractError>;

    async fn total_supply(&self) -> Result<U256, ContractError>;

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractError>;

    async fn token_uri(&self, token_id: TokenId) -> Result<String, ContractError>;

    async fn owner_of(&self, token_id: TokenId) -> Result<Address, ContractError>;

    /// Contract owner (the deployer).
    async fn owner(&self) -> Result<Address, ContractError>;

    async fn paused(&self) -> Result<bool, ContractError>;

    // Transactions

    async fn pause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError>;

    async fn unpause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError>;

    /// Owner-only mint of `token_id` to `to`.
    async fn mint(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError>;

    async fn approve(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError>;

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
        opts: TxOptions,
    ) -> Result<TxReceipt, ContractError>;
}

/// Handle to a `SolnSquareVerifier` deployment.
#[async_trait]
pub trait SquareVerifierToken: Erc721Mintable {
    /// Submit a proof and, if it verifies and is new, mint `token_id` to `to`
    /// in the same transaction.
    async fn add_solution(
        &self,
        proof: &Proof,
        input: &PublicInput,
        to: Address,
        token_id: TokenId,
        opts: TxOptions,
    ) -> Result<TxReceipt, ContractError>;
}
