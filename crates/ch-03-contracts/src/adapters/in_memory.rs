//! # In-Memory Contract
//!
//! A scripted stand-in for a deployed `SolnSquareVerifier` (and therefore
//! also an `ERC721Mintable`). It lets the scenarios run without a node.
//!
//! Behaviour is limited to what the scenarios observe: ownership, pausing,
//! minting, approvals, transfers and solution registration, with the
//! contracts' revert messages and events. Proof verification is delegated
//! to a [`ProofCheck`].

use crate::domain::{reasons, ContractError, DeedLedger, DeedMetadata, Revert};
use crate::ports::{AcceptAll, Erc721Mintable, ProofCheck, SquareVerifierToken};
use async_trait::async_trait;
use ch_01_abi::{encode_tokens, keccak256, square_input_words, Token};
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, Subscription};
use shared_types::{
    Address, ContractEvent, EmittedEvent, Proof, PublicInput, TokenId, TxOptions, TxReceipt, H256,
    U256,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Deployments made in this process; gives each contract a distinct address.
static DEPLOYMENTS: AtomicU64 = AtomicU64::new(0);

/// Gas reported for every in-memory transaction.
const FLAT_GAS: u64 = 21_000;

/// An in-process deed contract.
pub struct InMemoryToken {
    address: Address,
    ledger: Mutex<DeedLedger>,
    proof_check: Arc<dyn ProofCheck>,
    bus: InMemoryEventBus,
    block_number: AtomicU64,
    latency: Duration,
}

impl InMemoryToken {
    /// Deploy a new contract owned by `owner`.
    #[must_use]
    pub fn deploy(owner: Address, metadata: DeedMetadata) -> Self {
        let nonce = DEPLOYMENTS.fetch_add(1, Ordering::Relaxed);
        let mut seed = owner.as_bytes().to_vec();
        seed.extend_from_slice(&nonce.to_be_bytes());
        let address = Address::from_slice(&keccak256(&seed).as_bytes()[12..]);

        debug!(contract = ?address, owner = ?owner, name = %metadata.name, "In-memory contract deployed");

        Self {
            address,
            ledger: Mutex::new(DeedLedger::new(owner, metadata)),
            proof_check: Arc::new(AcceptAll),
            bus: InMemoryEventBus::new(),
            block_number: AtomicU64::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Replace the proof check used by `add_solution`.
    #[must_use]
    pub fn with_proof_check(mut self, check: Arc<dyn ProofCheck>) -> Self {
        self.proof_check = check;
        self
    }

    /// Delay every call by `latency`, to exercise timeouts.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Copy of the current contract state.
    #[must_use]
    pub fn snapshot(&self) -> DeedLedger {
        self.ledger.lock().clone()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn read<T>(&self, f: impl FnOnce(&DeedLedger) -> T + Send) -> T {
        self.delay().await;
        let ledger = self.ledger.lock();
        f(&ledger)
    }

    /// Apply a ledger transition as one mined transaction.
    async fn transact<F>(&self, opts: TxOptions, apply: F) -> Result<TxReceipt, ContractError>
    where
        F: FnOnce(&mut DeedLedger) -> Result<Vec<ContractEvent>, Revert> + Send,
    {
        self.delay().await;

        // The lock guard must not live across the publish awaits below
        let outcome = {
            let mut ledger = self.ledger.lock();
            apply(&mut ledger)
        };

        let events = match outcome {
            Ok(events) => events,
            Err(revert) => {
                warn!(contract = ?self.address, from = ?opts.from, reason = revert.0, "Transaction reverted");
                return Err(revert.into());
            }
        };

        let block_number = self.block_number.fetch_add(1, Ordering::Relaxed) + 1;
        let mut seed = self.address.as_bytes().to_vec();
        seed.extend_from_slice(&block_number.to_be_bytes());
        let tx_hash = keccak256(&seed);

        let events: Vec<EmittedEvent> = events
            .into_iter()
            .map(|event| EmittedEvent {
                contract: self.address,
                event,
                tx_hash: Some(tx_hash),
                block_number: Some(block_number),
            })
            .collect();

        for event in &events {
            self.bus.publish(event.clone()).await;
        }

        Ok(TxReceipt {
            tx_hash,
            block_number,
            status: true,
            gas_used: opts.gas.map_or(U256::from(FLAT_GAS), U256::from),
            events,
        })
    }
}

/// Registry key of a solution: hash of the proof and its inputs.
#[must_use]
pub fn solution_key(proof: &Proof, input: &PublicInput) -> H256 {
    let mut tokens = vec![
        Token::pair(proof.a.words()),
        Token::pair(proof.a_p.words()),
        Token::pair_of_pairs(proof.b.words()),
        Token::pair(proof.b_p.words()),
        Token::pair(proof.c.words()),
        Token::pair(proof.c_p.words()),
        Token::pair(proof.h.words()),
        Token::pair(proof.k.words()),
    ];
    tokens.extend(input.iter().map(|fe| Token::Uint(fe.value())));
    keccak256(&encode_tokens(&tokens))
}

#[async_trait]
impl Erc721Mintable for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    async fn is_owner(&self, caller: Address) -> Result<bool, ContractError> {
        Ok(self.read(|l| l.owner() == caller).await)
    }

    async fn name(&self) -> Result<String, ContractError> {
        Ok(self.read(|l| l.metadata().name.clone()).await)
    }

    async fn symbol(&self) -> Result<String, ContractError> {
        Ok(self.read(|l| l.metadata().symbol.clone()).await)
    }

    async fn base_token_uri(&self) -> Result<String, ContractError> {
        Ok(self.read(|l| l.metadata().base_token_uri.clone()).await)
    }

    async fn total_supply(&self) -> Result<U256, ContractError> {
        Ok(self.read(DeedLedger::total_supply).await)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractError> {
        Ok(self.read(|l| l.balance_of(&owner)).await)
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<String, ContractError> {
        Ok(self.read(|l| l.token_uri(token_id)).await?)
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Address, ContractError> {
        Ok(self.read(|l| l.owner_of(token_id)).await?)
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        Ok(self.read(DeedLedger::owner).await)
    }

    async fn paused(&self) -> Result<bool, ContractError> {
        Ok(self.read(DeedLedger::paused).await)
    }

    async fn pause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(opts, |l| l.pause(opts.from)).await
    }

    async fn unpause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(opts, |l| l.unpause(opts.from)).await
    }

    async fn mint(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(opts, |l| l.mint(opts.from, to, token_id)).await
    }

    async fn approve(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(opts, |l| l.approve(opts.from, to, token_id))
            .await
    }

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
        opts: TxOptions,
    ) -> Result<TxReceipt, ContractError> {
        self.transact(opts, |l| l.transfer_from(opts.from, from, to, token_id))
            .await
    }
}

#[async_trait]
impl SquareVerifierToken for InMemoryToken {
    async fn add_solution(
        &self,
        proof: &Proof,
        input: &PublicInput,
        to: Address,
        token_id: TokenId,
        opts: TxOptions,
    ) -> Result<TxReceipt, ContractError> {
        // Same calldata check the RPC backend applies before sending
        square_input_words(input)?;
        let verified = self.proof_check.verify(proof, input);
        let key = solution_key(proof, input);

        self.transact(opts, |l| {
            if !verified {
                return Err(Revert(reasons::INVALID_PROOF));
            }
            l.add_solution(opts.from, key, to, token_id)
        })
        .await
    }
}
