//! # Match Flow
//!
//! Drives one set from the first prompt to the final report. The flow owns
//! the `MatchState` and, for each phase, puts up exactly one prompt:
//!
//! | Phase | Prompt |
//! |---|---|
//! | `BlindPick` | private replies from both players (waiter) |
//! | `RpsPending` | private rock-paper-scissors replies (waiter), ties repeat |
//! | `StrikingStarters` | confirmable stage menu for the striker |
//! | `InGame` | one button per player, either may report |
//! | `WinnerPicksCharacter` / `LoserPicksCharacter` | channel reply (waiter) |
//! | `WinnerBansStages` | confirmable stage menu for the winner |
//! | `LoserCounterpicksStage` | stage selection for the loser |
//! | `Completed` | summary post |
//!
//! Prompt callbacks apply their transition with the token of the phase they
//! were put up for, then call `advance` again. A prompt that times out
//! abandons the match.

use crate::adapters::StoreError;
use crate::container::BotContainer;
use crate::handlers::rps::{duel, Rps};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use sb_01_sessions::{
    ButtonAction, ButtonActionMenu, ButtonMenuSettings, Choice, ConfirmableChoiceMenu,
    ConfirmableSettings, MenuError, SelectionAction, SelectionActionMenu, SelectionMenuSettings,
    SessionAction, SessionError, SessionHandle, SessionSettings, SessionTimeout,
};
use sb_02_choice_collection::{ChoiceScope, CollectedChoices, WaitId, WaitRejected, WaitRequest};
use sb_03_match_rules::{
    MatchError, MatchSettings, MatchState, MatchSummary, Phase, PhaseToken, Transition,
};
use setbot_telemetry::{
    log_match_event, metric_inc, MATCHES_FINISHED, MATCHES_STARTED, STALE_PHASE_ERRORS,
};
use shared_types::{
    Button, ButtonStyle, ChannelId, CharacterId, ChatError, GuildId, InteractionEvent,
    OutgoingMessage, SelectOption, StageId, UserId,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Errors that stop a match from starting or continuing.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Unknown ruleset '{0}'")]
    UnknownRuleset(String),

    #[error("Match rules rejected the request: {0}")]
    Match(#[from] MatchError),

    #[error("Could not build a menu: {0}")]
    Menu(#[from] MenuError),

    #[error("Menu failed: {0}")]
    Session(#[from] SessionError),

    #[error("Could not wait for choices: {0}")]
    Wait(#[from] WaitRejected),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// What a caller asks for when starting a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    /// Where the menus and updates are posted.
    pub channel: ChannelId,
    /// Guild settings (forced ruleset) apply when set.
    pub guild: Option<GuildId>,
    pub players: [UserId; 2],
    /// Falls back to the configured default.
    pub ruleset: Option<String>,
    /// Falls back to the configured default.
    pub first_to: Option<u32>,
    /// Run the blind pick and per-game character phases.
    pub track_characters: bool,
}

impl MatchRequest {
    pub fn new(channel: ChannelId, players: [UserId; 2]) -> Self {
        Self {
            channel,
            guild: None,
            players,
            ruleset: None,
            first_to: None,
            track_characters: true,
        }
    }

    #[must_use]
    pub fn in_guild(mut self, guild: GuildId) -> Self {
        self.guild = Some(guild);
        self
    }

    #[must_use]
    pub fn with_ruleset(mut self, ruleset: impl Into<String>) -> Self {
        self.ruleset = Some(ruleset.into());
        self
    }

    #[must_use]
    pub fn first_to(mut self, wins: u32) -> Self {
        self.first_to = Some(wins);
        self
    }

    #[must_use]
    pub fn without_characters(mut self) -> Self {
        self.track_characters = false;
        self
    }
}

/// How a set ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Completed(MatchSummary),
    /// Timed out, failed, or was stopped. `summary` is the state at that point.
    Abandoned { reason: String, summary: MatchSummary },
}

enum Prompt {
    Session(SessionHandle),
    Wait(WaitId),
}

/// One running set.
pub struct MatchFlow {
    container: Arc<BotContainer>,
    channel: ChannelId,
    state: MatchState,
    prompt: Mutex<Option<Prompt>>,
    outcome: watch::Sender<Option<MatchOutcome>>,
}

impl MatchFlow {
    /// Resolve the ruleset, announce the set and put up the first prompt.
    ///
    /// The guild's forced ruleset wins over the request, which wins over the
    /// configured default.
    pub async fn start(
        container: Arc<BotContainer>,
        request: MatchRequest,
    ) -> Result<MatchHandle, FlowError> {
        let ruleset_id = Self::ruleset_for(&container, &request).await?;
        let ruleset = container
            .rulesets
            .ruleset(&ruleset_id)
            .ok_or(FlowError::UnknownRuleset(ruleset_id))?;
        let settings = MatchSettings {
            first_to: request.first_to.unwrap_or(container.config.default_first_to),
            track_characters: request.track_characters,
        };
        let state = MatchState::new(ruleset, request.players, settings)?;

        let (outcome, receiver) = watch::channel(None);
        let flow = Arc::new(Self {
            container,
            channel: request.channel,
            state,
            prompt: Mutex::new(None),
            outcome,
        });

        metric_inc!(MATCHES_STARTED);
        log_match_event!(
            info,
            "Match flow started",
            flow.channel,
            ruleset = flow.state.ruleset().id(),
            first_to = settings.first_to
        );
        flow.container
            .chat
            .send_message(
                flow.channel,
                OutgoingMessage::text(format!(
                    "Set started: {} vs {}, first to {} ({}).",
                    request.players[0].mention(),
                    request.players[1].mention(),
                    settings.first_to,
                    flow.state.ruleset().name()
                )),
            )
            .await?;

        Arc::clone(&flow).advance().await;
        Ok(MatchHandle {
            flow,
            outcome: receiver,
        })
    }

    async fn ruleset_for(
        container: &BotContainer,
        request: &MatchRequest,
    ) -> Result<String, FlowError> {
        if let Some(guild) = request.guild {
            if let Some(forced) = container.store.forced_ruleset(guild).await? {
                return Ok(forced);
            }
        }
        Ok(request
            .ruleset
            .clone()
            .unwrap_or_else(|| container.config.default_ruleset.clone()))
    }

    fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Put up the prompt for the current phase.
    fn advance(self: Arc<Self>) -> BoxFuture<'static, ()> {
        async move {
            if self.is_finished() {
                return;
            }
            let snapshot = self.state.current();
            let token = snapshot.token;
            log_match_event!(
                debug,
                "Prompting",
                self.channel,
                phase = snapshot.phase.name(),
                token = %token
            );

            let result = match snapshot.phase {
                Phase::BlindPick => self.prompt_blind_pick(token).await,
                Phase::RpsPending => self.prompt_rps(token).await,
                Phase::StrikingStarters { striker, round } => {
                    self.prompt_strike(token, striker, round).await
                }
                Phase::InGame { game, stage } => self.prompt_report(token, game, stage).await,
                Phase::WinnerPicksCharacter { winner, .. } => {
                    self.prompt_character(token, winner).await
                }
                Phase::LoserPicksCharacter { loser, .. } => {
                    self.prompt_character(token, loser).await
                }
                Phase::WinnerBansStages { winner, count, .. } => {
                    self.prompt_bans(token, winner, count).await
                }
                Phase::LoserCounterpicksStage { loser, .. } => {
                    self.prompt_counterpick(token, loser).await
                }
                Phase::Completed { winner } => {
                    self.complete(winner).await;
                    Ok(())
                }
            };

            if let Err(e) = result {
                log_match_event!(error, "Could not put up prompt", self.channel, error = %e);
                self.abandon(format!("the bot could not continue ({e})")).await;
            }
        }
        .boxed()
    }

    /// Apply the outcome of a transition and move on.
    async fn commit(
        self: Arc<Self>,
        operation: &'static str,
        result: Result<Transition, MatchError>,
    ) {
        match result {
            Ok(transition) => {
                log_match_event!(
                    debug,
                    "Match advanced",
                    self.channel,
                    operation,
                    phase = transition.snapshot().phase.name()
                );
                self.advance().await;
            }
            Err(e @ (MatchError::StalePhase { .. } | MatchError::MatchCompleted)) => {
                metric_inc!(STALE_PHASE_ERRORS);
                log_match_event!(error, "Dropped stale match action", self.channel, operation, error = %e);
            }
            Err(e) => {
                log_match_event!(error, "Match action rejected", self.channel, operation, error = %e);
                self.announce(format!("That did not work: {e}. Please try again."))
                    .await;
                self.advance().await;
            }
        }
    }

    // =========================================================================
    // PROMPTS
    // =========================================================================

    async fn prompt_blind_pick(self: &Arc<Self>, token: PhaseToken) -> Result<(), FlowError> {
        let players = self.state.players();
        let flow = Arc::clone(self);
        let request = WaitRequest::new(
            players.to_vec(),
            ChoiceScope::DirectMessage,
            self.character_decoder(),
            move |choices: CollectedChoices<CharacterId>| async move {
                let picks = match (choices.get(players[0]), choices.get(players[1])) {
                    (Some(&first), Some(&second)) => [first, second],
                    _ => return,
                };
                flow.announce(format!(
                    "Blind picks: {} plays {}, {} plays {}.",
                    players[0].mention(),
                    flow.character_name(picks[0]),
                    players[1].mention(),
                    flow.character_name(picks[1])
                ))
                .await;
                let result = flow.state.submit_blind_picks(token, picks);
                flow.commit("submit blind picks", result).await;
            },
        )
        .with_timeout(self.container.config.choice_timeout)
        .ignore_double_choice(true)
        .on_timeout(self.abandon_on_wait_timeout("Blind pick"));

        let id = self.container.waiter.wait_for_choices(request)?;
        self.track(token, Prompt::Wait(id));
        for player in players {
            self.container
                .chat
                .send_direct_message(
                    player,
                    OutgoingMessage::text("Blind pick: reply with the character you will play."),
                )
                .await?;
        }
        Ok(())
    }

    async fn prompt_rps(self: &Arc<Self>, token: PhaseToken) -> Result<(), FlowError> {
        let players = self.state.players();
        let flow = Arc::clone(self);
        let request = WaitRequest::new(
            players.to_vec(),
            ChoiceScope::DirectMessage,
            self.hand_decoder(),
            move |choices: CollectedChoices<Rps>| async move {
                let hands = match (choices.get(players[0]), choices.get(players[1])) {
                    (Some(&first), Some(&second)) => [first, second],
                    _ => return,
                };
                match duel(hands) {
                    None => {
                        flow.announce(format!("Both players threw {}. Throw again!", hands[0]))
                            .await;
                        flow.advance().await;
                    }
                    Some(slot) => {
                        let winner = players[slot];
                        flow.announce(format!(
                            "{} wins rock-paper-scissors ({} vs {}) and strikes first.",
                            winner.mention(),
                            hands[0],
                            hands[1]
                        ))
                        .await;
                        let result = flow.state.resolve_rps(token, winner);
                        flow.commit("resolve rps", result).await;
                    }
                }
            },
        )
        .with_timeout(self.container.config.choice_timeout)
        .ignore_double_choice(true)
        .on_timeout(self.abandon_on_wait_timeout("Rock-paper-scissors"));

        let id = self.container.waiter.wait_for_choices(request)?;
        self.track(token, Prompt::Wait(id));
        for player in players {
            self.container
                .chat
                .send_direct_message(
                    player,
                    OutgoingMessage::text("Rock, paper or scissors? Reply here."),
                )
                .await?;
        }
        Ok(())
    }

    async fn prompt_strike(
        self: &Arc<Self>,
        token: PhaseToken,
        striker: UserId,
        round: usize,
    ) -> Result<(), FlowError> {
        let count = self
            .state
            .ruleset()
            .starter_strike_pattern()
            .get(round)
            .copied()
            .unwrap_or(1);
        let choices = self
            .state
            .unstruck_starters()
            .into_iter()
            .map(|(index, stage)| Choice::new(index, self.container.stage_name(stage)))
            .collect();

        let flow = Arc::clone(self);
        let on_timeout = self.abandon_on_session_timeout("Stage striking");
        let settings = ConfirmableSettings::new(
            format!("{}, strike {}.", striker.mention(), stages(count)),
            choices,
            move |indices: Vec<usize>, _event| async move {
                let result = flow.state.strike(token, striker, &indices);
                flow.commit("strike", result).await;
            },
        )
        .with_users([striker])
        .with_timeout(self.container.config.menu_timeout)
        .with_bounds(count, count)
        .on_timeout(move |timeout, _partial: Vec<usize>| on_timeout(timeout));

        let menu = ConfirmableChoiceMenu::new(
            Arc::clone(&self.container.chat),
            Arc::clone(&self.container.broker),
            settings,
        )?;
        let handle = menu.display(self.channel).await?;
        self.track(token, Prompt::Session(handle));
        Ok(())
    }

    async fn prompt_report(
        self: &Arc<Self>,
        token: PhaseToken,
        game: u32,
        stage: StageId,
    ) -> Result<(), FlowError> {
        let players = self.state.players();
        let score = self.state.score();
        let content = format!(
            "Game {game} on {} (score {}-{}). Who won?\nPlayer 1: {}\nPlayer 2: {}",
            self.container.stage_name(stage),
            score[0],
            score[1],
            players[0].mention(),
            players[1].mention()
        );

        let buttons = players
            .iter()
            .enumerate()
            .map(|(slot, &player)| {
                let flow = Arc::clone(self);
                let content = content.clone();
                ButtonAction::new(
                    Button::new(
                        format!("report:{}:{}", token.generation(), player),
                        format!("Player {}", slot + 1),
                        ButtonStyle::Primary,
                    ),
                    move |event: InteractionEvent| {
                        let flow = Arc::clone(&flow);
                        let content = content.clone();
                        async move {
                            flow.replace(
                                &event,
                                format!("{content}\nWinner: {}", player.mention()),
                            )
                            .await;
                            let result = flow.state.report_winner(token, player);
                            flow.commit("report winner", result).await;
                            SessionAction::Cancel
                        }
                    },
                )
            })
            .collect();

        let settings = ButtonMenuSettings {
            session: SessionSettings::default()
                .with_users(players)
                .with_timeout(self.container.config.menu_timeout)
                .on_timeout(self.abandon_on_session_timeout("Game report")),
            content,
            buttons,
        };
        let menu = ButtonActionMenu::new(
            Arc::clone(&self.container.chat),
            Arc::clone(&self.container.broker),
            settings,
        )?;
        let handle = menu.display(self.channel).await?;
        self.track(token, Prompt::Session(handle));
        Ok(())
    }

    async fn prompt_character(
        self: &Arc<Self>,
        token: PhaseToken,
        player: UserId,
    ) -> Result<(), FlowError> {
        let flow = Arc::clone(self);
        let request = WaitRequest::new(
            vec![player],
            ChoiceScope::Channel(self.channel),
            self.character_decoder(),
            move |choices: CollectedChoices<CharacterId>| async move {
                let Some(&character) = choices.get(player) else {
                    return;
                };
                let result = flow.state.pick_character(token, player, character);
                flow.commit("pick character", result).await;
            },
        )
        .with_timeout(self.container.config.choice_timeout)
        .on_timeout(self.abandon_on_wait_timeout("Character pick"));

        let id = self.container.waiter.wait_for_choices(request)?;
        self.track(token, Prompt::Wait(id));
        let game = self.state.summary().games.len() + 1;
        self.container
            .chat
            .send_message(
                self.channel,
                OutgoingMessage::text(format!(
                    "{}, reply with your character for game {game}.",
                    player.mention()
                )),
            )
            .await?;
        Ok(())
    }

    async fn prompt_bans(
        self: &Arc<Self>,
        token: PhaseToken,
        winner: UserId,
        count: usize,
    ) -> Result<(), FlowError> {
        let choices = self
            .state
            .stage_options()
            .into_iter()
            .map(|stage| Choice::new(stage, self.container.stage_name(stage)))
            .collect();

        let flow = Arc::clone(self);
        let on_timeout = self.abandon_on_session_timeout("Stage bans");
        let settings = ConfirmableSettings::new(
            format!("{}, ban {}.", winner.mention(), stages(count)),
            choices,
            move |banned: Vec<StageId>, _event| async move {
                let result = flow.state.ban_stages(token, winner, &banned);
                flow.commit("ban stages", result).await;
            },
        )
        .with_users([winner])
        .with_timeout(self.container.config.menu_timeout)
        .with_bounds(count, count)
        .on_timeout(move |timeout, _partial: Vec<StageId>| on_timeout(timeout));

        let menu = ConfirmableChoiceMenu::new(
            Arc::clone(&self.container.chat),
            Arc::clone(&self.container.broker),
            settings,
        )?;
        let handle = menu.display(self.channel).await?;
        self.track(token, Prompt::Session(handle));
        Ok(())
    }

    async fn prompt_counterpick(
        self: &Arc<Self>,
        token: PhaseToken,
        loser: UserId,
    ) -> Result<(), FlowError> {
        let content = format!("{}, pick the next stage.", loser.mention());
        let options = self
            .state
            .stage_options()
            .into_iter()
            .map(|stage| {
                let flow = Arc::clone(self);
                let name = self.container.stage_name(stage);
                let chosen = format!("{content}\nCounterpick: {name}");
                SelectionAction::new(SelectOption::new(stage.0.to_string(), name), move |event| {
                    let flow = Arc::clone(&flow);
                    let chosen = chosen.clone();
                    async move {
                        flow.replace(&event, chosen).await;
                        let result = flow.state.counterpick_stage(token, loser, stage);
                        flow.commit("counterpick stage", result).await;
                        SessionAction::Cancel
                    }
                })
            })
            .collect();

        let settings = SelectionMenuSettings {
            session: SessionSettings::default()
                .with_users([loser])
                .with_timeout(self.container.config.menu_timeout)
                .on_timeout(self.abandon_on_session_timeout("Counterpick")),
            content,
            menu_id: None,
            placeholder: Some("Choose a stage".to_string()),
            options,
        };
        let menu = SelectionActionMenu::new(
            Arc::clone(&self.container.chat),
            Arc::clone(&self.container.broker),
            settings,
        )?;
        let handle = menu.display(self.channel).await?;
        self.track(token, Prompt::Session(handle));
        Ok(())
    }

    // =========================================================================
    // ENDINGS
    // =========================================================================

    async fn complete(&self, winner: UserId) {
        let summary = self.state.summary();
        let report = self.render_summary(&summary, winner);
        if !self.finish(MatchOutcome::Completed(summary)) {
            return;
        }
        metric_inc!(MATCHES_FINISHED, &["completed"]);
        log_match_event!(info, "Match completed", self.channel, winner = %winner);
        self.announce(report).await;
    }

    /// End the set without a winner. No-op if it already ended.
    async fn abandon(&self, reason: String) {
        let outcome = MatchOutcome::Abandoned {
            reason: reason.clone(),
            summary: self.state.summary(),
        };
        if !self.finish(outcome) {
            return;
        }
        metric_inc!(MATCHES_FINISHED, &["abandoned"]);
        log_match_event!(warn, "Match abandoned", self.channel, reason = %reason);
        self.announce(format!("Match abandoned: {reason}.")).await;
    }

    /// Record the outcome and withdraw the pending prompt. Only the first
    /// call wins.
    fn finish(&self, outcome: MatchOutcome) -> bool {
        let mut outcome = Some(outcome);
        let set = self.outcome.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = outcome.take();
            true
        });
        if set {
            let prompt = self.prompt.lock().take();
            if let Some(prompt) = prompt {
                self.withdraw(prompt);
            }
        }
        set
    }

    /// Remember the prompt put up for `token`, unless the match moved on
    /// while it was being displayed.
    fn track(&self, token: PhaseToken, prompt: Prompt) {
        let mut current = self.prompt.lock();
        if self.is_finished() {
            drop(current);
            self.withdraw(prompt);
            return;
        }
        if self.state.current().token == token {
            *current = Some(prompt);
        }
    }

    fn withdraw(&self, prompt: Prompt) {
        match prompt {
            Prompt::Session(handle) => {
                handle.cancel();
            }
            Prompt::Wait(id) => {
                self.container.waiter.cancel(id);
            }
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn character_decoder(
        self: &Arc<Self>,
    ) -> impl Fn(InteractionEvent) -> BoxFuture<'static, Option<CharacterId>> + Send + Sync + 'static
    {
        let flow = Arc::clone(self);
        move |event: InteractionEvent| {
            let flow = Arc::clone(&flow);
            async move {
                let query = event.content()?.trim().to_string();
                match flow.container.catalog.find_character(&query) {
                    Some(character) => Some(character.id),
                    None => {
                        flow.reply(&event, format!("I don't know a character called '{query}'."))
                            .await;
                        None
                    }
                }
            }
            .boxed()
        }
    }

    fn hand_decoder(
        self: &Arc<Self>,
    ) -> impl Fn(InteractionEvent) -> BoxFuture<'static, Option<Rps>> + Send + Sync + 'static {
        let flow = Arc::clone(self);
        move |event: InteractionEvent| {
            let flow = Arc::clone(&flow);
            async move {
                let hand = Rps::parse(event.content()?);
                if hand.is_none() {
                    flow.reply(&event, "Please answer rock, paper or scissors.".to_string())
                        .await;
                }
                hand
            }
            .boxed()
        }
    }

    fn abandon_on_wait_timeout<T: Send + 'static>(
        self: &Arc<Self>,
        what: &'static str,
    ) -> impl FnOnce(CollectedChoices<T>) -> BoxFuture<'static, ()> + Send + 'static {
        let flow = Arc::clone(self);
        move |choices: CollectedChoices<T>| {
            async move {
                let missing: Vec<String> = choices.missing().iter().map(UserId::mention).collect();
                flow.abandon(format!("{what} timed out waiting for {}", missing.join(", ")))
                    .await;
            }
            .boxed()
        }
    }

    fn abandon_on_session_timeout(
        self: &Arc<Self>,
        what: &'static str,
    ) -> impl FnOnce(SessionTimeout) -> BoxFuture<'static, Result<(), SessionError>> + Send + 'static
    {
        let flow = Arc::clone(self);
        move |timeout: SessionTimeout| {
            async move {
                flow.abandon(format!("{what} timed out")).await;
                if timeout.channel.is_some() {
                    flow.container.chat.remove_components(timeout.message).await?;
                }
                Ok::<(), SessionError>(())
            }
            .boxed()
        }
    }

    async fn announce(&self, content: impl Into<String>) {
        let message = OutgoingMessage::text(content);
        if let Err(e) = self.container.chat.send_message(self.channel, message).await {
            log_match_event!(warn, "Failed to post match update", self.channel, error = %e);
        }
    }

    async fn reply(&self, event: &InteractionEvent, content: String) {
        let message = OutgoingMessage::text(content);
        if let Err(e) = self.container.chat.send_message(event.channel_id, message).await {
            log_match_event!(warn, "Failed to answer player", self.channel, error = %e);
        }
    }

    /// Replace a prompt with its final text, dropping the components.
    async fn replace(&self, event: &InteractionEvent, content: String) {
        let message = OutgoingMessage::text(content);
        if let Err(e) = self.container.chat.edit_message(event.message_ref(), message).await {
            log_match_event!(warn, "Failed to close prompt", self.channel, error = %e);
        }
    }

    fn character_name(&self, character: CharacterId) -> String {
        self.container
            .catalog
            .character(character)
            .map_or_else(|| character.to_string(), |c| c.name.clone())
    }

    fn render_summary(&self, summary: &MatchSummary, winner: UserId) -> String {
        let mut lines = vec![format!(
            "Set complete: {} wins {}-{}.",
            winner.mention(),
            summary.score[0].max(summary.score[1]),
            summary.score[0].min(summary.score[1])
        )];
        for game in &summary.games {
            let mut line = format!(
                "Game {}: {}, won by {}",
                game.number,
                self.container.stage_name(game.stage),
                game.winner.mention()
            );
            if let [Some(first), Some(second)] = game.characters {
                line.push_str(&format!(
                    " ({} vs {})",
                    self.character_name(first),
                    self.character_name(second)
                ));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

fn stages(count: usize) -> String {
    if count == 1 {
        "1 stage".to_string()
    } else {
        format!("{count} stages")
    }
}

/// Caller's view of a running set.
#[derive(Clone)]
pub struct MatchHandle {
    flow: Arc<MatchFlow>,
    outcome: watch::Receiver<Option<MatchOutcome>>,
}

impl MatchHandle {
    pub fn channel(&self) -> ChannelId {
        self.flow.channel
    }

    pub fn phase(&self) -> Phase {
        self.flow.state.current().phase
    }

    pub fn summary(&self) -> MatchSummary {
        self.flow.state.summary()
    }

    /// The outcome, if the set already ended.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome.borrow().clone()
    }

    /// Wait until the set ends.
    pub async fn finished(&mut self) -> MatchOutcome {
        loop {
            let current = self.outcome.borrow_and_update().clone();
            if let Some(outcome) = current {
                return outcome;
            }
            if self.outcome.changed().await.is_err() {
                return MatchOutcome::Abandoned {
                    reason: "match flow dropped".to_string(),
                    summary: self.summary(),
                };
            }
        }
    }

    /// Stop the set and withdraw its pending prompt.
    pub async fn abandon(&self, reason: impl Into<String>) {
        self.flow.abandon(reason.into()).await;
    }
}

impl std::fmt::Debug for MatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchHandle")
            .field("channel", &self.flow.channel)
            .field("phase", &self.flow.state.current().phase.name())
            .field("finished", &self.flow.is_finished())
            .finish()
    }
}
