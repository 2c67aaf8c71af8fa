//! # Shared Bus - Interaction Broker
//!
//! Routes incoming chat-platform interactions to the parts of the bot that
//! are waiting for them.
//!
//! ## Two delivery modes
//!
//! ```text
//!                    publish(event)
//!  gateway ─────────────────┐
//!                           ▼
//!                  ┌─────────────────┐   subscribe()   ┌──────────────┐
//!                  │  Event Broker   │ ──────────────► │ Choice waiter│
//!                  │                 │                 └──────────────┘
//!                  │                 │  await_event()  ┌──────────────┐
//!                  │                 │ ──────────────► │   Sessions   │
//!                  └─────────────────┘   (one-shot)    └──────────────┘
//! ```
//!
//! - **Broadcast:** long-lived subscribers see every matching event.
//! - **One-shot:** a registration completes on the first matching event or
//!   times out; exactly one of its callbacks runs.
//!
//! ## Delivery guard
//!
//! The time-bounded delivery cache drops interactions the platform delivers
//! twice, so no handler sees the same click or message more than once.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod delivery_cache;
pub mod events;
pub mod publisher;
pub mod registration;
pub mod subscriber;

pub use delivery_cache::{DeliveryError, TimeBoundedDeliveryCache};
pub use events::EventFilter;
pub use publisher::{EventBroker, EventPublisher, InMemoryEventBroker};
pub use registration::{
    EventPredicate, EventWaiter, MatchCallback, RegistrationId, TimeoutCallback,
};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
