//! # Event Publisher
//!
//! The in-memory broker: fans interactions out to broadcast subscribers and
//! completes one-shot registrations.

use crate::delivery_cache::TimeBoundedDeliveryCache;
use crate::events::EventFilter;
use crate::registration::{
    EventPredicate, EventWaiter, MatchCallback, Registration, RegistrationId, TimeoutCallback,
};
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use shared_types::InteractionEvent;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing interaction events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    ///
    /// Completes every pending registration whose predicate accepts the
    /// event and waits for their `on_match` callbacks. Returns the number of
    /// broadcast subscribers plus completed registrations.
    async fn publish(&self, event: InteractionEvent) -> usize;

    /// Total events accepted for publishing.
    fn events_published(&self) -> u64;
}

/// Everything a session or waiter needs from the broker.
pub trait EventBroker: EventPublisher + EventSubscriber + EventWaiter {}

impl<T: EventPublisher + EventSubscriber + EventWaiter> EventBroker for T {}

type Registry = Arc<Mutex<BTreeMap<RegistrationId, Registration>>>;

/// In-memory implementation of the broker.
///
/// Broadcast uses `tokio::sync::broadcast`; one-shot registrations live in an
/// ordered map so matches are delivered in registration order.
pub struct InMemoryEventBroker {
    sender: broadcast::Sender<InteractionEvent>,
    registrations: Registry,
    next_registration: AtomicU64,
    delivery_cache: Mutex<TimeBoundedDeliveryCache>,
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBroker {
    /// Create a broker with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a broker with the given broadcast capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            registrations: Arc::new(Mutex::new(BTreeMap::new())),
            next_registration: AtomicU64::new(1),
            delivery_cache: Mutex::new(TimeBoundedDeliveryCache::new()),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of active broadcast subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Broadcast channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn take_matching(&self, event: &InteractionEvent) -> Vec<(RegistrationId, Registration)> {
        let mut registrations = self.registrations.lock();
        let ids: Vec<RegistrationId> = registrations
            .iter()
            .filter(|(_, reg)| (reg.predicate)(event))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| registrations.remove(&id).map(|reg| (id, reg)))
            .collect()
    }
}

impl Default for InMemoryEventBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBroker {
    async fn publish(&self, event: InteractionEvent) -> usize {
        if let Err(e) = self.delivery_cache.lock().check_and_add(event.interaction_id) {
            warn!(error = %e, "Duplicate delivery ignored");
            return 0;
        }
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let receivers = self.sender.send(event.clone()).unwrap_or(0);

        let matched = self.take_matching(&event);
        let completed = matched.len();
        let callbacks: Vec<_> = matched
            .into_iter()
            .map(|(id, reg)| {
                reg.stop_timer();
                debug!(registration = %id, user = %event.user, "Registration matched");
                (reg.on_match)(event.clone())
            })
            .collect();
        join_all(callbacks).await;

        debug!(
            topic = ?event.topic(),
            receivers,
            completed,
            "Event published"
        );
        receivers + completed
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl EventSubscriber for InMemoryEventBroker {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let topic_key = format!("{:?}", filter.topics);
        *self.subscriptions.write().entry(topic_key.clone()).or_insert(0) += 1;

        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(receiver, filter, self.subscriptions.clone(), topic_key)
    }
}

impl EventWaiter for InMemoryEventBroker {
    fn await_event(
        &self,
        predicate: EventPredicate,
        timeout: Duration,
        on_match: MatchCallback,
        on_timeout: TimeoutCallback,
    ) -> RegistrationId {
        let id = RegistrationId(self.next_registration.fetch_add(1, Ordering::Relaxed));

        // Insert before the timer can observe the registry.
        let mut registrations = self.registrations.lock();
        let registry = Arc::clone(&self.registrations);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let expired = registry.lock().remove(&id);
            if let Some(reg) = expired {
                debug!(registration = %id, "Registration timed out");
                (reg.on_timeout)().await;
            }
        });
        registrations.insert(
            id,
            Registration {
                predicate,
                on_match,
                on_timeout,
                timer: Some(timer.abort_handle()),
            },
        );
        id
    }

    fn cancel(&self, id: RegistrationId) -> bool {
        match self.registrations.lock().remove(&id) {
            Some(reg) => {
                reg.stop_timer();
                debug!(registration = %id, "Registration cancelled");
                true
            }
            None => false,
        }
    }

    fn pending(&self) -> usize {
        self.registrations.lock().len()
    }
}
