//! # One-Shot Registrations
//!
//! A registration waits for the first interaction matching its predicate.
//! Exactly one of its two callbacks ever runs:
//!
//! - `on_match` when a matching event is published before the deadline
//! - `on_timeout` when the deadline passes first
//!
//! A cancelled registration runs neither.

use futures::future::BoxFuture;
use shared_types::InteractionEvent;
use std::fmt;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Identifier of a pending registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg#{}", self.0)
    }
}

/// Decides whether an event completes a registration.
///
/// Evaluated while the broker's registry lock is held: must not block.
pub type EventPredicate = Box<dyn Fn(&InteractionEvent) -> bool + Send + Sync>;

/// Runs when a matching event arrives.
pub type MatchCallback = Box<dyn FnOnce(InteractionEvent) -> BoxFuture<'static, ()> + Send>;

/// Runs when the deadline passes without a match.
pub type TimeoutCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Port for one-shot waits on interaction events.
pub trait EventWaiter: Send + Sync {
    /// Register a one-shot wait. Must be called from within a tokio runtime.
    fn await_event(
        &self,
        predicate: EventPredicate,
        timeout: Duration,
        on_match: MatchCallback,
        on_timeout: TimeoutCallback,
    ) -> RegistrationId;

    /// Drop a pending registration without running either callback.
    ///
    /// Returns `false` if it already completed or never existed.
    fn cancel(&self, id: RegistrationId) -> bool;

    /// Number of registrations still pending.
    fn pending(&self) -> usize;
}

pub(crate) struct Registration {
    pub(crate) predicate: EventPredicate,
    pub(crate) on_match: MatchCallback,
    pub(crate) on_timeout: TimeoutCallback,
    pub(crate) timer: Option<AbortHandle>,
}

impl Registration {
    pub(crate) fn stop_timer(&self) {
        if let Some(timer) = &self.timer {
            timer.abort();
        }
    }
}
