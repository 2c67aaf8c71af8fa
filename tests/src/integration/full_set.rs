//! # Full Set Through the Runtime
//!
//! Sets driven only by events handed to `BotRuntime::dispatch`, the way the
//! platform gateway feeds the bot.

#[cfg(test)]
mod tests {
    use crate::integration::support::{click, dm, select, settle};
    use bot_runtime::{BotConfig, BotContainer, BotRuntime, MatchHandle, MatchOutcome, MatchRequest};
    use sb_03_match_rules::Phase;
    use shared_types::{
        ChannelId, ChatCall, ChatClient, Component, MessageRef, OutgoingMessage,
        RecordingChatClient, StageId, UserId,
    };
    use std::sync::Arc;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const A: UserId = UserId(100);
    const B: UserId = UserId(200);
    const C: UserId = UserId(300);
    const D: UserId = UserId(400);
    const BYSTANDER: UserId = UserId(999);

    struct Bot {
        chat: Arc<RecordingChatClient>,
        runtime: BotRuntime,
    }

    impl Bot {
        fn start() -> Self {
            let chat = Arc::new(RecordingChatClient::new());
            let container =
                BotContainer::new(BotConfig::default(), Arc::clone(&chat) as Arc<dyn ChatClient>)
                    .unwrap();
            let runtime = BotRuntime::new(container);
            runtime.start();
            Self { chat, runtime }
        }

        async fn casual(&self, channel: ChannelId, players: [UserId; 2]) -> MatchHandle {
            self.runtime
                .start_match(
                    MatchRequest::new(channel, players)
                        .with_ruleset("casual")
                        .without_characters(),
                )
                .await
                .unwrap()
        }

        /// Latest message in `channel` that was sent with components.
        fn menu(&self, channel: ChannelId) -> (MessageRef, OutgoingMessage) {
            self.chat
                .calls()
                .into_iter()
                .rev()
                .find_map(|call| match call {
                    ChatCall::Send { target, message }
                        if target.channel_id == channel && !message.rows.is_empty() =>
                    {
                        Some((target, message))
                    }
                    _ => None,
                })
                .unwrap_or_else(|| panic!("no menu in {channel}"))
        }

        async fn click(&self, channel: ChannelId, user: UserId, label: &str) {
            let (target, message) = self.menu(channel);
            let id = message
                .components()
                .find_map(|c| match c {
                    Component::Button(b) if b.label == label => Some(b.id.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("no button labelled {label}"));
            self.runtime.dispatch(click(user, target, &id)).await;
        }

        async fn strike(&self, channel: ChannelId, user: UserId, stage: &str) {
            self.click(channel, user, stage).await;
            self.click(channel, user, "Confirm").await;
        }

        async fn counterpick(&self, channel: ChannelId, user: UserId, label: &str) {
            let (target, message) = self.menu(channel);
            let (menu, value) = message
                .components()
                .find_map(|c| match c {
                    Component::Select(s) => s
                        .options
                        .iter()
                        .find(|o| o.label == label)
                        .map(|o| (s.id.clone(), o.value.clone())),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("no option labelled {label}"));
            self.runtime
                .dispatch(select(user, target, &menu, &value))
                .await;
        }

        /// Both players answer rock-paper-scissors by direct message.
        async fn rps(&self, handle: &MatchHandle, hands: [(UserId, &str); 2]) {
            for (user, hand) in hands {
                self.runtime.dispatch(dm(user, hand)).await;
            }
            assert!(
                settle(|| matches!(handle.phase(), Phase::StrikingStarters { .. })).await,
                "rock-paper-scissors never resolved"
            );
        }
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_casual_set_driven_by_dispatch() {
        let bot = Bot::start();
        let channel = ChannelId(50);
        let mut handle = bot.casual(channel, [A, B]).await;
        assert_eq!(bot.runtime.active_matches().len(), 1);

        bot.rps(&handle, [(A, "paper"), (B, "rock")]).await;
        assert_eq!(
            handle.phase(),
            Phase::StrikingStarters {
                striker: A,
                round: 0
            }
        );

        // Starters: Battlefield, Smashville, Town and City.
        bot.strike(channel, A, "Town and City").await;
        bot.strike(channel, B, "Battlefield").await;
        assert_eq!(
            handle.phase(),
            Phase::InGame {
                game: 1,
                stage: StageId(5)
            }
        );

        // A bystander cannot report.
        bot.click(channel, BYSTANDER, "Player 1").await;
        assert_eq!(bot.chat.ephemerals_for(BYSTANDER).len(), 1);
        assert!(matches!(handle.phase(), Phase::InGame { game: 1, .. }));

        bot.click(channel, A, "Player 2").await;
        assert_eq!(
            handle.phase(),
            Phase::LoserCounterpicksStage {
                winner: B,
                loser: A
            }
        );
        bot.counterpick(channel, A, "Final Destination").await;
        bot.click(channel, B, "Player 1").await;

        bot.counterpick(channel, B, "Hollow Bastion").await;
        assert_eq!(
            handle.phase(),
            Phase::InGame {
                game: 3,
                stage: StageId(10)
            }
        );
        bot.click(channel, B, "Player 1").await;

        match handle.finished().await {
            MatchOutcome::Completed(summary) => {
                assert_eq!(summary.winner, Some(A));
                assert_eq!(summary.score, [2, 1]);
                let stages: Vec<StageId> = summary.games.iter().map(|g| g.stage).collect();
                assert_eq!(stages, vec![StageId(5), StageId(3), StageId(10)]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(bot.runtime.active_matches().is_empty());
        assert_eq!(bot.runtime.container().waiter.active_waits(), 0);
    }

    #[tokio::test]
    async fn test_parallel_sets_do_not_interfere() {
        let bot = Bot::start();
        let (left, right) = (ChannelId(60), ChannelId(61));
        let mut first = bot.casual(left, [A, B]).await;
        let mut second = bot.casual(right, [C, D]).await;
        assert_eq!(bot.runtime.active_matches().len(), 2);

        // Interleaved answers; each player's DM lands in their own set.
        for (user, hand) in [(A, "rock"), (C, "scissors"), (B, "paper"), (D, "rock")] {
            bot.runtime.dispatch(dm(user, hand)).await;
        }
        assert!(
            settle(|| {
                matches!(first.phase(), Phase::StrikingStarters { striker, .. } if striker == B)
                    && matches!(second.phase(), Phase::StrikingStarters { striker, .. } if striker == D)
            })
            .await
        );

        bot.strike(left, B, "Battlefield").await;
        bot.strike(right, D, "Smashville").await;
        bot.strike(left, A, "Smashville").await;
        bot.strike(right, C, "Battlefield").await;
        assert!(matches!(first.phase(), Phase::InGame { game: 1, .. }));
        assert!(matches!(second.phase(), Phase::InGame { game: 1, .. }));

        // Sweeps on both sides.
        bot.click(left, A, "Player 1").await;
        bot.click(right, D, "Player 2").await;
        bot.counterpick(left, B, "Final Destination").await;
        bot.counterpick(right, C, "Northern Cave").await;
        bot.click(left, B, "Player 1").await;
        bot.click(right, C, "Player 2").await;

        match (first.finished().await, second.finished().await) {
            (MatchOutcome::Completed(one), MatchOutcome::Completed(two)) => {
                assert_eq!(one.winner, Some(A));
                assert_eq!(one.score, [2, 0]);
                assert_eq!(two.winner, Some(D));
                assert_eq!(two.score, [0, 2]);
            }
            other => panic!("unexpected outcomes {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shutdown_mid_set_abandons_and_frees_players() {
        let bot = Bot::start();
        let channel = ChannelId(70);
        let mut handle = bot.casual(channel, [A, B]).await;
        bot.runtime.dispatch(dm(A, "rock")).await;

        bot.runtime.shutdown().await;
        match handle.finished().await {
            MatchOutcome::Abandoned { reason, summary } => {
                assert_eq!(reason, "the bot is shutting down");
                assert!(summary.games.is_empty());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(bot.runtime.container().waiter.active_waits(), 0);
    }
}
