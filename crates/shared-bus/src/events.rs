//! # Event Filters
//!
//! Subscriptions select events by kind and by emitting contract.

use shared_types::{Address, EmittedEvent, EventKind};

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
    /// Emitting contracts to include. Empty means all contracts.
    pub contracts: Vec<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific event kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds,
            contracts: Vec::new(),
        }
    }

    /// Restrict the filter to events emitted by `contract`.
    #[must_use]
    pub fn at(mut self, contract: Address) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &EmittedEvent) -> bool {
        let kind_match = self.kinds.is_empty()
            || self.kinds.contains(&EventKind::All)
            || self.kinds.contains(&event.event.kind());

        let contract_match = self.contracts.is_empty() || self.contracts.contains(&event.contract);

        kind_match && contract_match
    }
}
