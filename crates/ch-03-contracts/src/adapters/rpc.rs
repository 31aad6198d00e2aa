//! # JSON-RPC Contract Adapter
//!
//! Binds a deployed address to the contract handle ports.
//!
//! ## Transaction flow
//!
//! ```text
//! calldata (DeedAbi) → Signer::send → wait_for_receipt
//!     status 0 → replay as eth_call at the block → ContractError::Reverted
//!     status 1 → decode logs → publish to this contract's bus → TxReceipt
//! ```

use crate::domain::ContractError;
use crate::ports::{Erc721Mintable, SquareVerifierToken};
use async_trait::async_trait;
use ch_01_abi::{decode_address, decode_bool, decode_string, decode_u256, DeedAbi};
use ch_02_rpc_client::{BlockTag, CallRequest, RpcClient, Signer};
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, Subscription};
use shared_types::{Address, Proof, PublicInput, TokenId, TxOptions, TxReceipt, U256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Receipt polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(100),
        }
    }
}

/// A deed contract reached over JSON-RPC.
pub struct RpcContract {
    address: Address,
    client: Arc<RpcClient>,
    signer: Signer,
    receipts: ReceiptPolicy,
    bus: InMemoryEventBus,
}

impl RpcContract {
    pub fn new(address: Address, client: Arc<RpcClient>, signer: Signer, receipts: ReceiptPolicy) -> Self {
        Self {
            address,
            client,
            signer,
            receipts,
            bus: InMemoryEventBus::new(),
        }
    }

    async fn query(&self, data: Vec<u8>, from: Option<Address>) -> Result<Vec<u8>, ContractError> {
        let mut request = CallRequest::new(self.address, data);
        request.from = from;
        Ok(self.client.call(&request, BlockTag::Latest).await?)
    }

    async fn transact(&self, data: Vec<u8>, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        let mut request = CallRequest::new(self.address, data).sender(opts.from);
        if let Some(gas) = opts.gas {
            request = request.gas(gas);
        }

        let tx_hash = self.signer.send(&self.client, request.clone()).await?;
        debug!(contract = ?self.address, tx = ?tx_hash, from = ?opts.from, "Transaction sent");

        let receipt = self
            .client
            .wait_for_receipt(&tx_hash, self.receipts.poll_interval, self.receipts.timeout)
            .await?;

        if !receipt.succeeded() {
            let block = receipt.block_number.low_u64();
            let reason = match self.client.call(&request, BlockTag::Number(block)).await {
                Err(err) => err.revert_reason().map(str::to_string),
                Ok(_) => None,
            };
            warn!(contract = ?self.address, tx = ?tx_hash, reason = ?reason, "Transaction reverted");
            return Err(ContractError::Reverted {
                reason,
                tx_hash: Some(tx_hash),
            });
        }

        let receipt = receipt.into_receipt();
        for event in receipt.events.iter().filter(|e| e.contract == self.address) {
            self.bus.publish(event.clone()).await;
        }
        Ok(receipt)
    }
}

#[async_trait]
impl Erc721Mintable for RpcContract {
    fn address(&self) -> Address {
        self.address
    }

    fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    async fn is_owner(&self, caller: Address) -> Result<bool, ContractError> {
        Ok(decode_bool(&self.query(DeedAbi::is_owner(), Some(caller)).await?)?)
    }

    async fn name(&self) -> Result<String, ContractError> {
        Ok(decode_string(&self.query(DeedAbi::name(), None).await?)?)
    }

    async fn symbol(&self) -> Result<String, ContractError> {
        Ok(decode_string(&self.query(DeedAbi::symbol(), None).await?)?)
    }

    async fn base_token_uri(&self) -> Result<String, ContractError> {
        Ok(decode_string(&self.query(DeedAbi::base_token_uri(), None).await?)?)
    }

    async fn total_supply(&self) -> Result<U256, ContractError> {
        Ok(decode_u256(&self.query(DeedAbi::total_supply(), None).await?)?)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractError> {
        Ok(decode_u256(&self.query(DeedAbi::balance_of(&owner), None).await?)?)
    }

    async fn token_uri(&self, token_id: TokenId) -> Result<String, ContractError> {
        Ok(decode_string(&self.query(DeedAbi::token_uri(token_id), None).await?)?)
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Address, ContractError> {
        Ok(decode_address(&self.query(DeedAbi::owner_of(token_id), None).await?)?)
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        Ok(decode_address(&self.query(DeedAbi::owner(), None).await?)?)
    }

    async fn paused(&self) -> Result<bool, ContractError> {
        Ok(decode_bool(&self.query(DeedAbi::paused(), None).await?)?)
    }

    async fn pause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(DeedAbi::pause(), opts).await
    }

    async fn unpause(&self, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(DeedAbi::unpause(), opts).await
    }

    async fn mint(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(DeedAbi::mint(&to, token_id), opts).await
    }

    async fn approve(&self, to: Address, token_id: TokenId, opts: TxOptions) -> Result<TxReceipt, ContractError> {
        self.transact(DeedAbi::approve(&to, token_id), opts).await
    }

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: TokenId,
        opts: TxOptions,
    ) -> Result<TxReceipt, ContractError> {
        self.transact(DeedAbi::transfer_from(&from, &to, token_id), opts)
            .await
    }
}

#[async_trait]
impl SquareVerifierToken for RpcContract {
    async fn add_solution(
        &self,
        proof: &Proof,
        input: &PublicInput,
        to: Address,
        token_id: TokenId,
        opts: TxOptions,
    ) -> Result<TxReceipt, ContractError> {
        self.transact(DeedAbi::add_solution(proof, input, &to, token_id)?, opts)
            .await
    }
}
