//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `Address`, `H256`, `U256`, `TokenId`, `TxReceipt`
//! - **Events**: `ContractEvent`, `EmittedEvent`, `EventKind`
//! - **Calls**: `TxOptions`

use serde::{Deserialize, Serialize};

// Re-export primitive types for use across all crates
pub use primitive_types::{H160 as Address, H256, U256};

/// Token identifier as stored by the ERC-721 contract (`uint256`).
pub type TokenId = U256;

/// Transaction hash.
pub type TxHash = H256;

/// Sender options attached to every state-mutating call.
///
/// Mirrors the `{ from: ... }` object every transaction carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    /// Account that signs and pays for the transaction.
    pub from: Address,
    /// Optional gas limit; the client estimates when absent.
    pub gas: Option<u64>,
}

impl TxOptions {
    /// Options for a transaction sent from `from` with an estimated gas limit.
    #[must_use]
    pub fn sender(from: Address) -> Self {
        Self { from, gas: None }
    }

    /// Override the gas limit.
    #[must_use]
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// A decoded contract log.
///
/// Only the events the deed contracts emit are modelled; unknown logs are
/// dropped by the decoders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    /// `Paused(address account)`
    Paused {
        /// Account that paused the contract.
        account: Address,
    },
    /// `Unpaused(address account)`
    Unpaused {
        /// Account that unpaused the contract.
        account: Address,
    },
    /// `Transfer(address from, address to, uint256 tokenId)`
    ///
    /// A mint is a transfer from the zero address.
    Transfer {
        /// Previous owner (zero for mints).
        from: Address,
        /// New owner.
        to: Address,
        /// Token moved.
        token_id: TokenId,
    },
    /// `Approval(address owner, address approved, uint256 tokenId)`
    Approval {
        /// Token owner granting the approval.
        owner: Address,
        /// Account approved to move the token.
        approved: Address,
        /// Token the approval applies to.
        token_id: TokenId,
    },
    /// `SolutionAdded(uint256 index, address solver)`
    SolutionAdded {
        /// Solution index assigned by the verifier contract.
        index: U256,
        /// Account credited with the solution.
        solver: Address,
    },
}

impl ContractEvent {
    /// Get the kind of this event (for filtering).
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Paused { .. } => EventKind::Paused,
            Self::Unpaused { .. } => EventKind::Unpaused,
            Self::Transfer { .. } => EventKind::Transfer,
            Self::Approval { .. } => EventKind::Approval,
            Self::SolutionAdded { .. } => EventKind::SolutionAdded,
        }
    }

    /// Returns true if this is a `Transfer` out of the zero address.
    #[must_use]
    pub fn is_mint(&self) -> bool {
        matches!(self, Self::Transfer { from, .. } if from.is_zero())
    }
}

/// Event kinds for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// `Paused` events.
    Paused,
    /// `Unpaused` events.
    Unpaused,
    /// `Transfer` events (including mints).
    Transfer,
    /// `Approval` events.
    Approval,
    /// `SolutionAdded` events.
    SolutionAdded,
    /// All events (no filtering).
    All,
}

impl EventKind {
    /// Solidity event signature used to compute the log topic.
    ///
    /// Returns `None` for [`EventKind::All`].
    #[must_use]
    pub fn signature(&self) -> Option<&'static str> {
        match self {
            Self::Paused => Some("Paused(address)"),
            Self::Unpaused => Some("Unpaused(address)"),
            Self::Transfer => Some("Transfer(address,address,uint256)"),
            Self::Approval => Some("Approval(address,address,uint256)"),
            Self::SolutionAdded => Some("SolutionAdded(uint256,address)"),
            Self::All => None,
        }
    }
}

/// A decoded event together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Address of the emitting contract.
    pub contract: Address,
    /// The decoded event.
    pub event: ContractEvent,
    /// Transaction that produced the log, when known.
    pub tx_hash: Option<TxHash>,
    /// Block the log was included in, when known.
    pub block_number: Option<u64>,
}

// =============================================================================
// RECEIPTS
// =============================================================================

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Block the transaction was mined in.
    pub block_number: u64,
    /// `true` if execution succeeded, `false` if it reverted.
    pub status: bool,
    /// Gas consumed.
    pub gas_used: U256,
    /// Events decoded from the receipt logs, in log order.
    pub events: Vec<EmittedEvent>,
}

impl TxReceipt {
    /// Iterate the decoded events of a given kind.
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &ContractEvent> {
        self.events
            .iter()
            .map(|e| &e.event)
            .filter(move |e| kind == EventKind::All || e.kind() == kind)
    }
}
