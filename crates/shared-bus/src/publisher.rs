//! # Event Publisher
//!
//! Contract adapters push decoded receipt logs through here, one
//! [`EmittedEvent`] per log, in log order.

use crate::events::EventFilter;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use shared_types::EmittedEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Sink for decoded contract events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`; returns how many live subscriptions saw it.
    async fn publish(&self, event: EmittedEvent) -> usize;

    /// Events published since the bus was created.
    fn published(&self) -> u64;
}

/// Per-contract event bus over a `tokio::sync::broadcast` channel.
///
/// Filtering happens on the subscriber side, so every live subscription
/// counts as a receiver regardless of its filter.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EmittedEvent>,
    published: AtomicU64,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Open a subscription; only events published after this call arrive.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(kinds = ?filter.kinds, contracts = ?filter.contracts, "Subscribed to contract events");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EmittedEvent) -> usize {
        let kind = event.event.kind();
        let contract = event.contract;
        let tx = event.tx_hash;
        self.published.fetch_add(1, Ordering::Relaxed);

        if let Ok(receivers) = self.sender.send(event) {
            debug!(?kind, ?contract, ?tx, receivers, "Contract event published");
            receivers
        } else {
            // Steps that do not await events never subscribe
            trace!(?kind, ?contract, "Contract event had no subscribers");
            0
        }
    }

    fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
