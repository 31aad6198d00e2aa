//! # Shared Bus - Contract Event Bus
//!
//! Decoded contract events flow from a contract adapter to the scenarios
//! through this bus.
//!
//! ```text
//! ┌──────────────┐   publish()    ┌──────────────┐   subscribe()   ┌──────────────┐
//! │   Contract   │ ─────────────→ │  Event Bus   │ ──────────────→ │   Scenario   │
//! │   Adapter    │  (per receipt) │              │  (awaited, with │     Step     │
//! └──────────────┘                └──────────────┘    timeout)     └──────────────┘
//! ```
//!
//! ## Rules
//!
//! - Subscribe **before** sending the transaction whose events you expect;
//!   broadcast channels do not replay history.
//! - Waiting is always bounded: `Subscription::wait_for` takes a timeout.
//! - Dropping a `Subscription` unsubscribes it.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::EventFilter;
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
