//! # Deed Ledger
//!
//! State machine of one `SolnSquareVerifier` instance (which is also a full
//! `ERC721Mintable`): ownership, pausing, token ownership, approvals,
//! balances and the solution registry.
//!
//! Every mutating method either returns the events the contract would emit
//! or a [`Revert`], in which case the state is untouched.

use super::errors::{reasons, Revert};
use shared_types::{Address, ContractEvent, TokenId, H256, U256};
use std::collections::HashMap;

/// Metadata fixed at deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeedMetadata {
    pub name: String,
    pub symbol: String,
    pub base_token_uri: String,
}

/// A registered verifier solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub index: U256,
    pub solver: Address,
    pub token_id: TokenId,
}

type LedgerResult = Result<Vec<ContractEvent>, Revert>;

/// Contract state.
#[derive(Debug, Clone)]
pub struct DeedLedger {
    owner: Address,
    metadata: DeedMetadata,
    paused: bool,
    token_owners: HashMap<TokenId, Address>,
    approvals: HashMap<TokenId, Address>,
    balances: HashMap<Address, U256>,
    total_supply: U256,
    solutions: HashMap<H256, Solution>,
}

impl DeedLedger {
    /// Fresh contract owned by the deployer.
    #[must_use]
    pub fn new(owner: Address, metadata: DeedMetadata) -> Self {
        Self {
            owner,
            metadata,
            paused: false,
            token_owners: HashMap::new(),
            approvals: HashMap::new(),
            balances: HashMap::new(),
            total_supply: U256::zero(),
            solutions: HashMap::new(),
        }
    }

    // ---- queries ----

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    #[must_use]
    pub fn metadata(&self) -> &DeedMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    #[must_use]
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address, Revert> {
        self.token_owners
            .get(&token_id)
            .copied()
            .ok_or(Revert(reasons::NONEXISTENT_TOKEN))
    }

    /// `baseTokenURI` followed by the decimal token id.
    pub fn token_uri(&self, token_id: TokenId) -> Result<String, Revert> {
        self.owner_of(token_id)?;
        Ok(format!("{}{}", self.metadata.base_token_uri, token_id))
    }

    #[must_use]
    pub fn approved(&self, token_id: TokenId) -> Option<Address> {
        self.approvals.get(&token_id).copied()
    }

    #[must_use]
    pub fn solution(&self, key: &H256) -> Option<&Solution> {
        self.solutions.get(key)
    }

    // ---- guards ----

    fn only_owner(&self, caller: Address) -> Result<(), Revert> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(Revert(reasons::NOT_OWNER))
        }
    }

    fn when_not_paused(&self) -> Result<(), Revert> {
        if self.paused {
            Err(Revert(reasons::PAUSED))
        } else {
            Ok(())
        }
    }

    // ---- transactions ----

    pub fn pause(&mut self, caller: Address) -> LedgerResult {
        self.only_owner(caller)?;
        self.when_not_paused()?;
        self.paused = true;
        Ok(vec![ContractEvent::Paused { account: caller }])
    }

    pub fn unpause(&mut self, caller: Address) -> LedgerResult {
        self.only_owner(caller)?;
        if !self.paused {
            return Err(Revert(reasons::NOT_PAUSED));
        }
        self.paused = false;
        Ok(vec![ContractEvent::Unpaused { account: caller }])
    }

    /// Owner-only mint.
    pub fn mint(&mut self, caller: Address, to: Address, token_id: TokenId) -> LedgerResult {
        self.only_owner(caller)?;
        self.mint_unchecked(to, token_id)
    }

    fn mint_unchecked(&mut self, to: Address, token_id: TokenId) -> LedgerResult {
        self.when_not_paused()?;
        if to.is_zero() {
            return Err(Revert(reasons::INVALID_ADDRESS));
        }
        if self.token_owners.contains_key(&token_id) {
            return Err(Revert(reasons::ALREADY_MINTED));
        }

        self.token_owners.insert(token_id, to);
        *self.balances.entry(to).or_default() += U256::one();
        self.total_supply += U256::one();

        Ok(vec![ContractEvent::Transfer {
            from: Address::zero(),
            to,
            token_id,
        }])
    }

    pub fn approve(&mut self, caller: Address, to: Address, token_id: TokenId) -> LedgerResult {
        let token_owner = self.owner_of(token_id)?;
        if to == token_owner {
            return Err(Revert(reasons::APPROVAL_TO_OWNER));
        }
        if caller != token_owner {
            return Err(Revert(reasons::NOT_APPROVED));
        }

        self.approvals.insert(token_id, to);
        Ok(vec![ContractEvent::Approval {
            owner: token_owner,
            approved: to,
            token_id,
        }])
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> LedgerResult {
        self.when_not_paused()?;
        let token_owner = self.owner_of(token_id)?;
        if caller != token_owner && self.approved(token_id) != Some(caller) {
            return Err(Revert(reasons::NOT_APPROVED));
        }
        if from != token_owner {
            return Err(Revert(reasons::WRONG_FROM));
        }
        if to.is_zero() {
            return Err(Revert(reasons::INVALID_ADDRESS));
        }

        self.approvals.remove(&token_id);
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance = balance.saturating_sub(U256::one());
        }
        *self.balances.entry(to).or_default() += U256::one();
        self.token_owners.insert(token_id, to);

        Ok(vec![ContractEvent::Transfer { from, to, token_id }])
    }

    /// Register a verified solution under `key` and mint `token_id` to `to`.
    ///
    /// The caller checks the proof; the ledger only enforces that each
    /// solution is used once and that the mint itself is valid.
    pub fn add_solution(&mut self, caller: Address, key: H256, to: Address, token_id: TokenId) -> LedgerResult {
        if self.solutions.contains_key(&key) {
            return Err(Revert(reasons::SOLUTION_EXISTS));
        }

        let mut events = self.mint_unchecked(to, token_id)?;

        let index = U256::from(self.solutions.len());
        self.solutions.insert(
            key,
            Solution {
                index,
                solver: caller,
                token_id,
            },
        );
        events.insert(
            0,
            ContractEvent::SolutionAdded {
                index,
                solver: caller,
            },
        );
        Ok(events)
    }
}
