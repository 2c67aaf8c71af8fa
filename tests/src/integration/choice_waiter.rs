//! # Choice Waiter Scenarios
//!
//! The waiter fed from a broker subscription, the way the runtime runs it.

#[cfg(test)]
mod tests {
    use crate::integration::support::{click, dm, say, settle};
    use bot_runtime::Rps;
    use sb_02_choice_collection::{
        ChoiceScope, CollectedChoices, MultiPartyChoiceWaiter, WaitRejected, WaitRequest,
    };
    use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBroker};
    use shared_types::{ChannelId, ComponentId, MessageId, MessageRef, UserId};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const A: UserId = UserId(100);
    const B: UserId = UserId(200);
    const C: UserId = UserId(300);
    const CHANNEL: ChannelId = ChannelId(50);
    const MINUTE: Duration = Duration::from_secs(60);

    struct Fixture {
        broker: Arc<InMemoryEventBroker>,
        waiter: Arc<MultiPartyChoiceWaiter>,
    }

    impl Fixture {
        /// Waiter running on the broker's message stream.
        fn running() -> Self {
            let broker = Arc::new(InMemoryEventBroker::new());
            let waiter = Arc::new(MultiPartyChoiceWaiter::new());
            tokio::spawn(Arc::clone(&waiter).run(broker.subscribe(EventFilter::messages_only())));
            Self { broker, waiter }
        }

        /// Register a rock-paper-scissors wait. Completion and timeout both
        /// report on the returned channel.
        fn hands(
            &self,
            participants: Vec<UserId>,
            scope: ChoiceScope,
            timeout: Duration,
        ) -> Result<mpsc::UnboundedReceiver<CollectedChoices<Rps>>, WaitRejected> {
            let (tx, rx) = mpsc::unbounded_channel();
            let late = tx.clone();
            let request = WaitRequest::new(
                participants,
                scope,
                |event| async move { event.content().and_then(Rps::parse) },
                move |choices| async move {
                    let _ = tx.send(choices);
                },
            )
            .ignore_double_choice(true)
            .with_timeout(timeout)
            .on_timeout(move |partial| async move {
                let _ = late.send(partial);
            });
            self.waiter.wait_for_choices(request)?;
            Ok(rx)
        }
    }

    // =========================================================================
    // COLLECTION
    // =========================================================================

    #[tokio::test]
    async fn test_first_choice_sticks_when_double_choices_are_ignored() {
        let f = Fixture::running();
        let mut rx = f.hands(vec![A, B], ChoiceScope::DirectMessage, MINUTE).unwrap();

        f.broker.publish(dm(A, "rock")).await;
        f.broker.publish(dm(A, "paper")).await;
        f.broker.publish(dm(B, "not a hand")).await;
        f.broker.publish(dm(B, "s")).await;

        let choices = rx.recv().await.unwrap();
        assert!(choices.is_complete());
        assert_eq!(choices.participants(), &[A, B]);
        assert_eq!(choices.get(A), Some(&Rps::Rock));
        assert_eq!(choices.get(B), Some(&Rps::Scissors));
        assert_eq!(bot_runtime::handlers::duel([Rps::Rock, Rps::Scissors]), Some(0));
        assert!(settle(|| f.waiter.active_waits() == 0).await);
    }

    #[tokio::test]
    async fn test_channel_wait_ignores_other_streams() {
        let f = Fixture::running();
        let mut rx = f
            .hands(vec![A, B], ChoiceScope::Channel(CHANNEL), MINUTE)
            .unwrap();

        // Wrong channel, direct message, and a component click.
        f.broker.publish(say(A, ChannelId(51), "rock")).await;
        f.broker.publish(dm(B, "paper")).await;
        let menu = MessageRef::new(CHANNEL, MessageId(1));
        f.broker.publish(click(A, menu, &ComponentId::new("rock"))).await;
        f.broker.publish(say(C, CHANNEL, "paper")).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(rx.try_recv().is_err());
        assert!(f.waiter.is_waiting(A, ChoiceScope::Channel(CHANNEL)));
        assert!(f.waiter.is_waiting(B, ChoiceScope::Channel(CHANNEL)));

        f.broker.publish(say(B, CHANNEL, "paper")).await;
        f.broker.publish(say(A, CHANNEL, "rock")).await;
        let choices = rx.recv().await.unwrap();
        assert_eq!(choices.get(A), Some(&Rps::Rock));
        assert_eq!(choices.get(B), Some(&Rps::Paper));
        assert_eq!(choices.get(C), None);
    }

    // =========================================================================
    // EXCLUSIVITY
    // =========================================================================

    #[tokio::test]
    async fn test_participant_busy_until_their_wait_ends() {
        let f = Fixture::running();
        let mut first = f.hands(vec![A, B], ChoiceScope::DirectMessage, MINUTE).unwrap();

        assert_eq!(
            f.hands(vec![C, B], ChoiceScope::DirectMessage, MINUTE).err(),
            Some(WaitRejected::Busy {
                user: B,
                scope: ChoiceScope::DirectMessage
            })
        );
        // The rejected request left no trace for C.
        assert!(!f.waiter.is_waiting(C, ChoiceScope::DirectMessage));
        // Another scope is independent.
        let _other = f
            .hands(vec![B], ChoiceScope::Channel(CHANNEL), MINUTE)
            .unwrap();
        assert_eq!(f.waiter.active_waits(), 2);

        f.broker.publish(dm(A, "r")).await;
        f.broker.publish(dm(B, "p")).await;
        first.recv().await.unwrap();
        assert!(settle(|| !f.waiter.is_waiting(B, ChoiceScope::DirectMessage)).await);

        assert!(f.hands(vec![C, B], ChoiceScope::DirectMessage, MINUTE).is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_wait_frees_participants() {
        let f = Fixture::running();
        let (tx, mut rx) = oneshot::channel::<()>();
        let id = f
            .waiter
            .wait_for_choices(WaitRequest::new(
                vec![A],
                ChoiceScope::DirectMessage,
                |event| async move { event.content().and_then(Rps::parse) },
                move |_| async move {
                    let _ = tx.send(());
                },
            ))
            .unwrap();

        assert!(f.waiter.cancel(id));
        assert!(!f.waiter.cancel(id));
        f.broker.publish(dm(A, "rock")).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(rx.try_recv().is_err());
        assert!(f.hands(vec![A], ChoiceScope::DirectMessage, MINUTE).is_ok());
    }

    // =========================================================================
    // TIMEOUTS
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_partial_choices_once() {
        let f = Fixture::running();
        let mut rx = f
            .hands(
                vec![A, B],
                ChoiceScope::DirectMessage,
                Duration::from_secs(30),
            )
            .unwrap();

        f.broker.publish(dm(A, "scissors")).await;
        tokio::time::sleep(Duration::from_secs(31)).await;

        let partial = rx.recv().await.unwrap();
        assert!(!partial.is_complete());
        assert_eq!(partial.get(A), Some(&Rps::Scissors));
        assert_eq!(partial.missing(), vec![B]);
        assert_eq!(f.waiter.active_waits(), 0);

        // A late answer reaches nobody.
        f.broker.publish(dm(B, "rock")).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!f.waiter.is_waiting(B, ChoiceScope::DirectMessage));
        assert!(rx.try_recv().is_err());
    }
}
