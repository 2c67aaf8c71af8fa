//! # Multi-Party Choice Waiter
//!
//! Tracks one outstanding choice per participant across unrelated incoming
//! messages. A participant can be part of at most one wait per scope; a
//! request naming a busy participant is rejected before any state exists.

use crate::domain::errors::WaitRejected;
use crate::domain::request::WaitRequest;
use crate::domain::scope::{ChoiceScope, WaitId};
use crate::element::{Element, Registry, SharedRegistry};
use parking_lot::Mutex;
use setbot_telemetry::{metric_add, metric_inc, ACTIVE_PARTICIPANTS, CHOICE_WAITS};
use shared_bus::Subscription;
use shared_types::{InteractionEvent, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collects one decoded choice from each participant.
pub struct MultiPartyChoiceWaiter {
    registry: SharedRegistry,
    next_id: AtomicU64,
}

impl MultiPartyChoiceWaiter {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a wait.
    ///
    /// Duplicate participants are collapsed, keeping first-seen order. Must
    /// be called from within a tokio runtime.
    pub fn wait_for_choices<T: Send + 'static>(
        &self,
        request: WaitRequest<T>,
    ) -> Result<WaitId, WaitRejected> {
        let WaitRequest {
            participants,
            scope,
            decode,
            on_done,
            timeout,
            on_timeout,
            ignore_double_choice,
        } = request;

        let mut unique: Vec<UserId> = Vec::with_capacity(participants.len());
        for user in participants {
            if !unique.contains(&user) {
                unique.push(user);
            }
        }
        if unique.is_empty() {
            return Err(WaitRejected::NoParticipants);
        }

        let mut registry = self.registry.lock();
        if let Some(&user) = unique.iter().find(|&&u| registry.is_active(scope, u)) {
            metric_inc!(CHOICE_WAITS, &["rejected"]);
            warn!(user = %user, scope = %scope, "Participant already has an active choice wait");
            return Err(WaitRejected::Busy { user, scope });
        }

        let id = WaitId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let element = Arc::new(Element::new(
            id,
            scope,
            unique.clone(),
            ignore_double_choice,
            decode,
            on_done,
            on_timeout,
            Arc::clone(&self.registry),
        ));

        // The timer locks the registry before touching the element, so it
        // cannot run until this registration is complete.
        let timer = {
            let element = Arc::clone(&element);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                element.expire().await;
            })
        };
        element.set_timer(timer.abort_handle());

        for &user in &unique {
            registry.active.insert((scope, user), id);
        }
        registry.elements.insert(id, element);

        metric_inc!(CHOICE_WAITS, &["started"]);
        metric_add!(ACTIVE_PARTICIPANTS, unique.len() as f64);
        info!(
            wait = %id,
            scope = %scope,
            participants = unique.len(),
            timeout_secs = timeout.as_secs(),
            "Choice wait registered"
        );
        Ok(id)
    }

    /// Offer an incoming message to the wait its author belongs to.
    ///
    /// Returns `false` when no wait tracks the author in the event's scope.
    pub async fn handle_event(&self, event: InteractionEvent) -> bool {
        if event.content().is_none() {
            return false;
        }
        let element = self
            .registry
            .lock()
            .element_for(ChoiceScope::of(&event), event.user);
        match element {
            Some(element) => {
                element.offer(event).await;
                true
            }
            None => false,
        }
    }

    /// Retire a wait without running either callback.
    pub fn cancel(&self, id: WaitId) -> bool {
        let mut registry = self.registry.lock();
        let Some(element) = registry.elements.get(&id).cloned() else {
            return false;
        };
        let retired = element.retire_silently(&mut registry);
        if retired {
            metric_inc!(CHOICE_WAITS, &["cancelled"]);
            debug!(wait = %id, "Choice wait cancelled");
        }
        retired
    }

    /// Whether `user` is being waited on in `scope`.
    pub fn is_waiting(&self, user: UserId, scope: ChoiceScope) -> bool {
        self.registry.lock().is_active(scope, user)
    }

    /// Number of live waits.
    pub fn active_waits(&self) -> usize {
        self.registry.lock().elements.len()
    }

    /// Feed the waiter from a broker subscription until it closes.
    pub async fn run(self: Arc<Self>, mut subscription: Subscription) {
        info!("Choice waiter listening");
        while let Some(event) = subscription.recv().await {
            self.handle_event(event).await;
        }
        info!("Choice waiter stopped");
    }
}

impl Default for MultiPartyChoiceWaiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::choices::CollectedChoices;
    use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBroker};
    use shared_types::{ChannelId, GuildId, InteractionKind, MessageId};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    static NEXT_INTERACTION: AtomicU64 = AtomicU64::new(1);

    fn dm(user: u64, content: &str) -> InteractionEvent {
        InteractionEvent {
            interaction_id: NEXT_INTERACTION.fetch_add(1, Ordering::Relaxed),
            user: UserId(user),
            channel_id: ChannelId(1_000_000 + user),
            message_id: MessageId(NEXT_INTERACTION.load(Ordering::Relaxed)),
            guild_id: None,
            kind: InteractionKind::Message {
                content: content.to_string(),
            },
        }
    }

    fn in_channel(user: u64, channel: u64, content: &str) -> InteractionEvent {
        InteractionEvent {
            guild_id: Some(GuildId(1)),
            channel_id: ChannelId(channel),
            ..dm(user, content)
        }
    }

    /// Accepts rock/paper/scissors.
    async fn rps(event: InteractionEvent) -> Option<String> {
        let content = event.content()?.trim().to_lowercase();
        ["rock", "paper", "scissors"]
            .contains(&content.as_str())
            .then_some(content)
    }

    type Outcome = Arc<Mutex<Vec<(&'static str, CollectedChoices<String>)>>>;

    fn request(users: &[u64], outcome: &Outcome) -> WaitRequest<String> {
        let done = Arc::clone(outcome);
        let timed_out = Arc::clone(outcome);
        WaitRequest::new(
            users.iter().map(|&u| UserId(u)).collect(),
            ChoiceScope::DirectMessage,
            rps,
            move |choices| async move { done.lock().push(("done", choices)) },
        )
        .with_timeout(Duration::from_secs(60))
        .on_timeout(move |choices| async move { timed_out.lock().push(("timeout", choices)) })
    }

    #[tokio::test]
    async fn test_ignore_double_choice_scenario() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter
            .wait_for_choices(request(&[1, 2], &outcome).ignore_double_choice(true))
            .unwrap();

        assert!(waiter.handle_event(dm(1, "rock")).await);
        assert!(!waiter.handle_event(dm(1, "paper")).await);
        assert!(outcome.lock().is_empty());
        assert!(waiter.handle_event(dm(2, "scissors")).await);

        let outcome = outcome.lock();
        assert_eq!(outcome.len(), 1);
        let (kind, choices) = &outcome[0];
        assert_eq!(*kind, "done");
        assert_eq!(choices.get(UserId(1)).map(String::as_str), Some("rock"));
        assert_eq!(choices.get(UserId(2)).map(String::as_str), Some("scissors"));
        assert_eq!(waiter.active_waits(), 0);
    }

    #[tokio::test]
    async fn test_later_choice_overwrites_without_ignore() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter.wait_for_choices(request(&[1, 2], &outcome)).unwrap();

        waiter.handle_event(dm(1, "rock")).await;
        assert!(waiter.handle_event(dm(1, "paper")).await);
        waiter.handle_event(dm(2, "rock")).await;

        let outcome = outcome.lock();
        assert_eq!(outcome[0].1.get(UserId(1)).map(String::as_str), Some("paper"));
    }

    #[tokio::test]
    async fn test_invalid_choice_keeps_waiting() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter.wait_for_choices(request(&[1], &outcome)).unwrap();

        waiter.handle_event(dm(1, "lizard")).await;
        assert!(outcome.lock().is_empty());
        assert!(waiter.is_waiting(UserId(1), ChoiceScope::DirectMessage));

        waiter.handle_event(dm(1, "Rock ")).await;
        assert_eq!(outcome.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_busy_participant_rejected() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter.wait_for_choices(request(&[1, 2], &outcome)).unwrap();

        let rejected = waiter.wait_for_choices(request(&[3, 2], &outcome));
        assert_eq!(
            rejected,
            Err(WaitRejected::Busy {
                user: UserId(2),
                scope: ChoiceScope::DirectMessage
            })
        );
        assert_eq!(waiter.active_waits(), 1);
        assert!(!waiter.is_waiting(UserId(3), ChoiceScope::DirectMessage));
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter.wait_for_choices(request(&[1], &outcome)).unwrap();

        let mut in_room = request(&[1], &outcome);
        in_room.scope = ChoiceScope::Channel(ChannelId(50));
        waiter.wait_for_choices(in_room).unwrap();

        // A channel message only reaches the channel-scoped wait.
        waiter.handle_event(in_channel(1, 50, "paper")).await;
        assert_eq!(outcome.lock().len(), 1);
        assert!(waiter.is_waiting(UserId(1), ChoiceScope::DirectMessage));

        // A message in another channel reaches nothing.
        assert!(!waiter.handle_event(in_channel(1, 51, "rock")).await);
    }

    #[tokio::test]
    async fn test_no_participants_rejected() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        assert_eq!(
            waiter.wait_for_choices(request(&[], &outcome)),
            Err(WaitRejected::NoParticipants)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_once_with_partial() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter.wait_for_choices(request(&[1, 2], &outcome)).unwrap();
        waiter.handle_event(dm(1, "rock")).await;

        tokio::time::sleep(Duration::from_secs(61)).await;

        {
            let outcome = outcome.lock();
            assert_eq!(outcome.len(), 1);
            let (kind, choices) = &outcome[0];
            assert_eq!(*kind, "timeout");
            assert_eq!(choices.missing(), vec![UserId(2)]);
        }

        // Late answer after retirement falls through.
        assert!(!waiter.handle_event(dm(2, "paper")).await);
        assert_eq!(outcome.lock().len(), 1);
        assert!(!waiter.is_waiting(UserId(1), ChoiceScope::DirectMessage));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_callback_runs_past_its_first_await() {
        let waiter = MultiPartyChoiceWaiter::new();
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (begin, end) = (Arc::clone(&started), Arc::clone(&finished));
        waiter
            .wait_for_choices(
                WaitRequest::new(vec![UserId(1)], ChoiceScope::DirectMessage, rps, |_| async {})
                    .with_timeout(Duration::from_secs(5))
                    .on_timeout(move |_| async move {
                        begin.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        end.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(waiter.active_waits(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_prevents_timeout() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        waiter.wait_for_choices(request(&[1], &outcome)).unwrap();
        waiter.handle_event(dm(1, "rock")).await;

        tokio::time::sleep(Duration::from_secs(120)).await;

        let outcome = outcome.lock();
        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome[0].0, "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_runs_nothing() {
        let waiter = MultiPartyChoiceWaiter::new();
        let outcome = Outcome::default();
        let id = waiter.wait_for_choices(request(&[1, 2], &outcome)).unwrap();

        assert!(waiter.cancel(id));
        assert!(!waiter.cancel(id));
        assert!(!waiter.is_waiting(UserId(1), ChoiceScope::DirectMessage));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(outcome.lock().is_empty());

        // The participants are free again.
        waiter.wait_for_choices(request(&[1, 2], &outcome)).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_answers_complete_once() {
        let waiter = Arc::new(MultiPartyChoiceWaiter::new());
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let users: Vec<UserId> = (1..=16).map(UserId).collect();
        waiter
            .wait_for_choices(WaitRequest::new(
                users,
                ChoiceScope::DirectMessage,
                rps,
                move |choices: CollectedChoices<String>| async move {
                    assert!(choices.is_complete());
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            ))
            .unwrap();

        let tasks: Vec<_> = (1..=16u64)
            .flat_map(|u| [dm(u, "rock"), dm(u, "paper")])
            .map(|event| {
                let waiter = Arc::clone(&waiter);
                tokio::spawn(async move { waiter.handle_event(event).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(waiter.active_waits(), 0);
    }

    #[tokio::test]
    async fn test_run_from_broker_subscription() {
        let broker = InMemoryEventBroker::new();
        let waiter = Arc::new(MultiPartyChoiceWaiter::new());
        let outcome = Outcome::default();
        waiter
            .wait_for_choices(request(&[1, 2], &outcome).ignore_double_choice(true))
            .unwrap();
        let runner = tokio::spawn(
            Arc::clone(&waiter).run(broker.subscribe(EventFilter::messages_only())),
        );

        broker.publish(dm(1, "rock")).await;
        broker.publish(dm(2, "paper")).await;

        for _ in 0..50 {
            if !outcome.lock().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(outcome.lock().len(), 1);
        runner.abort();
    }
}
