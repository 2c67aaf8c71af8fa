//! # Session Guarantees
//!
//! Menu sessions running against the real in-memory broker, alongside the
//! choice waiter and a live match.

#[cfg(test)]
mod tests {
    use crate::integration::support::{click, dm, settle};
    use sb_01_sessions::{
        ButtonAction, ButtonActionMenu, ButtonMenuSettings, Choice, ConfirmableChoiceMenu,
        ConfirmableSettings, SessionAction, SessionSettings,
    };
    use sb_02_choice_collection::{ChoiceScope, MultiPartyChoiceWaiter, WaitRequest};
    use sb_03_match_rules::{MatchSettings, MatchState, Phase, RulesetCatalog, RulesetSource};
    use shared_bus::{EventFilter, EventPublisher, EventSubscriber, EventWaiter, InMemoryEventBroker};
    use shared_types::{
        Button, ButtonStyle, Catalog, ChannelId, ChatClient, Component, ComponentId,
        OutgoingMessage, RecordingChatClient, StageId, UserId,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const A: UserId = UserId(100);
    const B: UserId = UserId(200);
    const CHANNEL: ChannelId = ChannelId(50);

    struct Fixture {
        chat: Arc<RecordingChatClient>,
        broker: Arc<InMemoryEventBroker>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                chat: Arc::new(RecordingChatClient::new()),
                broker: Arc::new(InMemoryEventBroker::new()),
            }
        }

        fn chat(&self) -> Arc<dyn ChatClient> {
            self.chat.clone()
        }

        /// A single-button menu whose handler counts and then does `action`.
        fn counting_menu(
            &self,
            session: SessionSettings,
            hits: &Arc<AtomicUsize>,
            action: SessionAction,
        ) -> ButtonActionMenu {
            let hits = Arc::clone(hits);
            let button = ButtonAction::new(Button::new("go", "Go", ButtonStyle::Primary), move |_| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    action
                }
            });
            ButtonActionMenu::new(
                self.chat(),
                self.broker.clone(),
                ButtonMenuSettings {
                    session,
                    content: "Ready?".to_string(),
                    buttons: vec![button],
                },
            )
            .unwrap()
        }
    }

    fn button_id(message: &OutgoingMessage, label: &str) -> ComponentId {
        message
            .components()
            .find_map(|c| match c {
                Component::Button(b) if b.label == label => Some(b.id.clone()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no button labelled {label}"))
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clicks_run_terminal_handler_once() {
        let f = Fixture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = f
            .counting_menu(SessionSettings::default(), &hits, SessionAction::Cancel)
            .display(CHANNEL)
            .await
            .unwrap();
        let message = handle.message().unwrap();
        let go = ComponentId::new("go");

        let clicks = (0..16u64).map(|i| {
            let broker = Arc::clone(&f.broker);
            let event = click(UserId(1 + i % 4), message, &go);
            tokio::spawn(async move { broker.publish(event).await })
        });
        for result in futures::future::join_all(clicks).await {
            result.unwrap();
        }

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
        assert_eq!(f.broker.pending(), 0);
    }

    #[tokio::test]
    async fn test_restricted_menu_ignores_outsiders_until_owner_clicks() {
        let f = Fixture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = f
            .counting_menu(
                SessionSettings::default().with_users([A]),
                &hits,
                SessionAction::Cancel,
            )
            .display(CHANNEL)
            .await
            .unwrap();
        let message = handle.message().unwrap();
        let go = ComponentId::new("go");

        for _ in 0..3 {
            f.broker.publish(click(B, message, &go)).await;
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(f.chat.ephemerals_for(B).len(), 3);
        assert_eq!(f.broker.pending(), 1);

        f.broker.publish(click(A, message, &go)).await;
        f.broker.publish(click(A, message, &go)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(f.chat.ephemerals_for(A).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_once_and_late_clicks_are_ignored() {
        let f = Fixture::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let timeouts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&timeouts);
        let session = SessionSettings::default()
            .with_timeout(Duration::from_secs(10))
            .on_timeout(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let handle = f
            .counting_menu(session, &hits, SessionAction::Continue)
            .display(CHANNEL)
            .await
            .unwrap();
        let message = handle.message().unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        f.broker.publish(click(A, message, &ComponentId::new("go"))).await;

        assert_eq!(timeouts.load(Ordering::SeqCst), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(handle.is_finished());
        assert_eq!(f.broker.pending(), 0);
    }

    // =========================================================================
    // SHARED BROKER
    // =========================================================================

    #[tokio::test]
    async fn test_menu_and_waiter_share_one_broker() {
        let f = Fixture::new();
        let waiter = Arc::new(MultiPartyChoiceWaiter::new());
        tokio::spawn(
            Arc::clone(&waiter).run(f.broker.subscribe(EventFilter::messages_only())),
        );

        let (tx, rx) = oneshot::channel();
        waiter
            .wait_for_choices(WaitRequest::new(
                vec![A],
                ChoiceScope::DirectMessage,
                |event| async move { event.content().map(str::to_string) },
                move |choices| async move {
                    let _ = tx.send(choices.get(A).cloned());
                },
            ))
            .unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let handle = f
            .counting_menu(SessionSettings::default(), &hits, SessionAction::Cancel)
            .display(CHANNEL)
            .await
            .unwrap();

        // The click goes to the menu only, the message to the waiter only.
        f.broker
            .publish(click(A, handle.message().unwrap(), &ComponentId::new("go")))
            .await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(waiter.active_waits(), 1);

        f.broker.publish(dm(A, "hello")).await;
        assert_eq!(rx.await.unwrap().as_deref(), Some("hello"));
        assert!(settle(|| waiter.active_waits() == 0).await);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    // =========================================================================
    // MENUS DRIVING A MATCH
    // =========================================================================

    #[tokio::test]
    async fn test_strike_menus_select_the_first_stage() {
        let f = Fixture::new();
        let stages = Catalog::embedded().unwrap();
        let rulesets = RulesetCatalog::embedded(&stages).unwrap();
        let state = Arc::new(
            MatchState::new(
                rulesets.ruleset("casual").unwrap(),
                [A, B],
                MatchSettings {
                    first_to: 2,
                    track_characters: false,
                },
            )
            .unwrap(),
        );
        let rps = state.current();
        state.resolve_rps(rps.token, A).unwrap();

        // Two strike rounds of one stage each, A then B.
        for (striker, label) in [(A, "Battlefield"), (B, "Town and City")] {
            let snapshot = state.current();
            let choices = state
                .unstruck_starters()
                .into_iter()
                .map(|(index, stage)| Choice::new(index, stages.stage(stage).unwrap().name.clone()))
                .collect();
            let target = Arc::clone(&state);
            let menu = ConfirmableChoiceMenu::new(
                f.chat(),
                f.broker.clone(),
                ConfirmableSettings::new("Strike a stage", choices, move |indices, event| async move {
                    target.strike(snapshot.token, event.user, &indices).unwrap();
                })
                .with_users([striker]),
            )
            .unwrap();
            let rendered = menu.rendered().clone();
            let message = menu.display(CHANNEL).await.unwrap().message().unwrap();

            f.broker
                .publish(click(striker, message, &button_id(&rendered, label)))
                .await;
            f.broker
                .publish(click(striker, message, &button_id(&rendered, "Confirm")))
                .await;
        }

        assert_eq!(
            state.current().phase,
            Phase::InGame {
                game: 1,
                stage: StageId(5)
            }
        );
        assert_eq!(f.broker.pending(), 0);
    }
}
