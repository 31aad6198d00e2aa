//! # Subscriptions
//!
//! A step opens a [`Subscription`] on a contract, sends the transaction,
//! then awaits the event it expects with a deadline.

use crate::events::EventFilter;
use shared_types::EmittedEvent;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The contract handle owning the bus was dropped.
    #[error("Event bus closed")]
    Closed,

    /// No matching event arrived in time.
    #[error("No matching event within {waited_ms}ms")]
    Timeout { waited_ms: u64 },
}

/// Receiving end of a contract's event bus, narrowed by an [`EventFilter`].
///
/// Unsubscribes on drop.
pub struct Subscription {
    receiver: broadcast::Receiver<EmittedEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<EmittedEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Next event passing the filter, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<EmittedEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscription fell behind; events lost");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Buffered event passing the filter, without waiting.
    pub fn try_recv(&mut self) -> Result<Option<EmittedEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Next event passing the filter, waiting at most `timeout`.
    pub async fn next_within(&mut self, timeout: Duration) -> Result<EmittedEvent, SubscriptionError> {
        self.wait_for(timeout, |_| true).await
    }

    /// Wait for the first matching event that also satisfies `predicate`.
    ///
    /// Events that match the filter but fail the predicate are consumed and
    /// discarded.
    pub async fn wait_for<P>(
        &mut self,
        timeout: Duration,
        mut predicate: P,
    ) -> Result<EmittedEvent, SubscriptionError>
    where
        P: FnMut(&EmittedEvent) -> bool + Send,
    {
        let wait = async {
            while let Some(event) = self.recv().await {
                if predicate(&event) {
                    return Ok(event);
                }
            }
            Err(SubscriptionError::Closed)
        };

        tokio::time::timeout(timeout, wait)
            .await
            .unwrap_or(Err(SubscriptionError::Timeout {
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }))
    }

    /// Every matching event already buffered.
    pub fn drain(&mut self) -> Vec<EmittedEvent> {
        std::iter::from_fn(|| self.try_recv().ok().flatten()).collect()
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(kinds = ?self.filter.kinds, "Unsubscribed from contract events");
    }
}
