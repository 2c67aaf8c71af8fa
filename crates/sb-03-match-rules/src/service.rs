//! # Match State Machine
//!
//! Drives one best-of-N set through its phases.
//!
//! ```text
//! [BlindPick] -> RpsPending -> StrikingStarters* -> [BlindPick] -> InGame
//!
//! InGame --report--> Completed
//!        \-> (stage first)     WinnerBansStages -> LoserCounterpicksStage
//!                              -> WinnerPicksCharacter -> LoserPicksCharacter -> InGame
//!        \-> (character first) WinnerPicksCharacter -> LoserPicksCharacter
//!                              -> WinnerBansStages -> LoserCounterpicksStage -> InGame
//! ```
//!
//! Bracketed phases only run when characters are tracked; the game 1 blind
//! pick runs before or after striking depending on the ruleset. A ban phase
//! with nothing to ban is skipped.
//!
//! Every transition takes the `PhaseToken` of the phase it acts on. The
//! generation counter and the mutex make concurrent transitions on the same
//! token resolve to exactly one success.

use crate::algorithms::{
    counterpick_pool, effective_ban_count, remaining_starter, unstruck_starters, validate_strike,
};
use crate::domain::{
    GameRecord, MatchError, MatchSettings, MatchSummary, Phase, PhaseSnapshot, PhaseToken,
    Ruleset, StrikeKind, StrikeRecord, Transition,
};
use crate::state::MatchProgress;
use parking_lot::Mutex;
use shared_types::{CharacterId, StageId, UserId};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of a successful transition body.
enum Step {
    Advance(Phase),
    Continue(Phase),
}

/// One best-of-N set between two players.
pub struct MatchState {
    ruleset: Arc<Ruleset>,
    players: [UserId; 2],
    settings: MatchSettings,
    progress: Mutex<MatchProgress>,
}

impl MatchState {
    /// Start a set.
    ///
    /// # Errors
    ///
    /// - `MatchError::SamePlayers` - Both slots hold the same user
    /// - `MatchError::InvalidFirstTo` - Zero, or above the ruleset's cap
    pub fn new(
        ruleset: Arc<Ruleset>,
        players: [UserId; 2],
        settings: MatchSettings,
    ) -> Result<Self, MatchError> {
        if players[0] == players[1] {
            return Err(MatchError::SamePlayers);
        }
        let maximum = ruleset.maximum_first_to_what_score();
        if settings.first_to == 0 || maximum.is_some_and(|max| settings.first_to > max) {
            return Err(MatchError::InvalidFirstTo {
                requested: settings.first_to,
                maximum,
            });
        }

        let initial = if settings.track_characters && ruleset.blind_pick_before_stage() {
            Phase::BlindPick
        } else {
            Phase::RpsPending
        };
        info!(
            ruleset = ruleset.id(),
            first_to = settings.first_to,
            player_one = %players[0],
            player_two = %players[1],
            "Match started"
        );

        Ok(Self {
            ruleset,
            players,
            settings,
            progress: Mutex::new(MatchProgress::new(initial)),
        })
    }

    pub fn ruleset(&self) -> &Arc<Ruleset> {
        &self.ruleset
    }

    pub fn players(&self) -> [UserId; 2] {
        self.players
    }

    pub fn settings(&self) -> MatchSettings {
        self.settings
    }

    /// The other player.
    pub fn opponent(&self, player: UserId) -> Result<UserId, MatchError> {
        Ok(self.players[1 - self.slot(player)?])
    }

    /// Current phase and the token to act on it.
    pub fn current(&self) -> PhaseSnapshot {
        let progress = self.progress.lock();
        PhaseSnapshot {
            token: PhaseToken(progress.generation),
            phase: progress.phase.clone(),
        }
    }

    /// Wins in player order.
    pub fn score(&self) -> [u32; 2] {
        self.progress.lock().score(&self.players)
    }

    /// Stages of every started game, in order.
    pub fn selected_stages(&self) -> Vec<StageId> {
        self.progress.lock().selected_stages.clone()
    }

    /// Starters not yet struck, with their strike indices.
    pub fn unstruck_starters(&self) -> Vec<(usize, StageId)> {
        let progress = self.progress.lock();
        unstruck_starters(self.ruleset.starters(), &progress.struck_starters)
    }

    /// Stages offered in the current phase: bannable stages while the winner
    /// bans, counterpickable stages while the loser picks, otherwise empty.
    pub fn stage_options(&self) -> Vec<StageId> {
        let progress = self.progress.lock();
        match progress.phase {
            Phase::WinnerBansStages { loser, .. } => {
                counterpick_pool(&self.ruleset, loser, &progress.games)
            }
            Phase::LoserCounterpicksStage { loser, .. } => {
                counterpick_pool(&self.ruleset, loser, &progress.games)
                    .into_iter()
                    .filter(|s| !progress.current_bans.contains(s))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Snapshot for reporting.
    pub fn summary(&self) -> MatchSummary {
        let progress = self.progress.lock();
        MatchSummary {
            ruleset_id: self.ruleset.id().to_string(),
            players: self.players,
            first_to: self.settings.first_to,
            score: progress.score(&self.players),
            games: progress.games.clone(),
            strikes: progress.strikes.clone(),
            winner: match progress.phase {
                Phase::Completed { winner } => Some(winner),
                _ => None,
            },
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Record both blind-picked characters, in player order.
    pub fn submit_blind_picks(
        &self,
        token: PhaseToken,
        picks: [CharacterId; 2],
    ) -> Result<Transition, MatchError> {
        self.transition(token, "submit blind picks", |progress| {
            if progress.phase != Phase::BlindPick {
                return Err(wrong_phase("submit blind picks", &progress.phase));
            }
            progress.next_characters = picks.map(Some);
            progress.blind_picked = true;
            match progress.next_stage {
                Some(_) => self.start_game(progress).map(Step::Advance),
                None => Ok(Step::Advance(Phase::RpsPending)),
            }
        })
    }

    /// Rock-paper-scissors decided who strikes first.
    pub fn resolve_rps(
        &self,
        token: PhaseToken,
        first_striker: UserId,
    ) -> Result<Transition, MatchError> {
        self.transition(token, "resolve rps", |progress| {
            if progress.phase != Phase::RpsPending {
                return Err(wrong_phase("resolve rps", &progress.phase));
            }
            self.slot(first_striker)?;

            if self.ruleset.starter_strike_pattern().is_empty() {
                let stage = self.ruleset.starters()[0];
                return self.first_stage_selected(progress, stage).map(Step::Advance);
            }
            Ok(Step::Advance(Phase::StrikingStarters {
                striker: first_striker,
                round: 0,
            }))
        })
    }

    /// Strike starters by index. The final round selects the lowest unstruck
    /// starter as game 1's stage; earlier rounds hand over to the other player.
    pub fn strike(
        &self,
        token: PhaseToken,
        player: UserId,
        indices: &[usize],
    ) -> Result<Transition, MatchError> {
        self.transition(token, "strike", |progress| {
            let (striker, round) = match progress.phase {
                Phase::StrikingStarters { striker, round } => (striker, round),
                ref other => return Err(wrong_phase("strike", other)),
            };
            if player != striker {
                return Err(MatchError::NotYourTurn {
                    expected: striker,
                    got: player,
                });
            }
            let pattern = self.ruleset.starter_strike_pattern();
            let starters = self.ruleset.starters();
            validate_strike(indices, pattern[round], starters.len(), &progress.struck_starters)?;

            progress.struck_starters.extend_from_slice(indices);
            progress.strikes.push(StrikeRecord {
                game: 1,
                player,
                kind: StrikeKind::Strike,
                stages: indices.iter().map(|&i| starters[i]).collect(),
            });

            if round + 1 < pattern.len() {
                return Ok(Step::Continue(Phase::StrikingStarters {
                    striker: self.players[1 - self.slot(striker)?],
                    round: round + 1,
                }));
            }

            // sum(pattern) == starters - 1 leaves exactly one.
            let index = remaining_starter(starters.len(), &progress.struck_starters).unwrap_or(0);
            self.first_stage_selected(progress, starters[index])
                .map(Step::Advance)
        })
    }

    /// Report the winner of the game in progress.
    pub fn report_winner(
        &self,
        token: PhaseToken,
        winner: UserId,
    ) -> Result<Transition, MatchError> {
        self.transition(token, "report winner", |progress| {
            let (game, stage) = match progress.phase {
                Phase::InGame { game, stage } => (game, stage),
                ref other => return Err(wrong_phase("report winner", other)),
            };
            let loser = self.opponent(winner)?;

            progress.games.push(GameRecord {
                number: game,
                stage,
                characters: progress.next_characters,
                winner,
            });
            progress.next_stage = None;
            progress.current_bans.clear();
            if self.settings.track_characters {
                progress.next_characters = [None, None];
            }

            let wins = progress.score(&self.players)[self.slot(winner)?];
            if wins >= self.settings.first_to {
                info!(winner = %winner, games = game, "Match completed");
                return Ok(Step::Advance(Phase::Completed { winner }));
            }

            if self.settings.track_characters && !self.ruleset.stage_before_character() {
                Ok(Step::Advance(Phase::WinnerPicksCharacter { winner, loser }))
            } else {
                Ok(Step::Advance(self.begin_stage_selection(progress, winner, loser)))
            }
        })
    }

    /// Pick a character for the next game (winner first, then loser).
    pub fn pick_character(
        &self,
        token: PhaseToken,
        player: UserId,
        character: CharacterId,
    ) -> Result<Transition, MatchError> {
        self.transition(token, "pick character", |progress| match progress.phase {
            Phase::WinnerPicksCharacter { winner, loser } => {
                if player != winner {
                    return Err(MatchError::NotYourTurn {
                        expected: winner,
                        got: player,
                    });
                }
                progress.next_characters[self.slot(winner)?] = Some(character);
                Ok(Step::Advance(Phase::LoserPicksCharacter { winner, loser }))
            }
            Phase::LoserPicksCharacter { winner, loser } => {
                if player != loser {
                    return Err(MatchError::NotYourTurn {
                        expected: loser,
                        got: player,
                    });
                }
                progress.next_characters[self.slot(loser)?] = Some(character);
                if self.ruleset.stage_before_character() {
                    self.start_game(progress).map(Step::Advance)
                } else {
                    Ok(Step::Advance(self.begin_stage_selection(progress, winner, loser)))
                }
            }
            ref other => Err(wrong_phase("pick character", other)),
        })
    }

    /// The previous winner bans stages from the counterpick pool.
    pub fn ban_stages(
        &self,
        token: PhaseToken,
        player: UserId,
        stages: &[StageId],
    ) -> Result<Transition, MatchError> {
        self.transition(token, "ban stages", |progress| {
            let (winner, loser, count) = match progress.phase {
                Phase::WinnerBansStages {
                    winner,
                    loser,
                    count,
                } => (winner, loser, count),
                ref other => return Err(wrong_phase("ban stages", other)),
            };
            if player != winner {
                return Err(MatchError::NotYourTurn {
                    expected: winner,
                    got: player,
                });
            }
            if stages.len() != count {
                return Err(MatchError::WrongStageCount {
                    expected: count,
                    got: stages.len(),
                });
            }
            let pool = counterpick_pool(&self.ruleset, loser, &progress.games);
            for (i, stage) in stages.iter().enumerate() {
                if !pool.contains(stage) || stages[..i].contains(stage) {
                    return Err(MatchError::StageNotAvailable(*stage));
                }
            }

            progress.current_bans = stages.to_vec();
            progress.strikes.push(StrikeRecord {
                game: progress.next_game_number(),
                player,
                kind: StrikeKind::Ban,
                stages: stages.to_vec(),
            });
            Ok(Step::Advance(Phase::LoserCounterpicksStage { winner, loser }))
        })
    }

    /// The previous loser picks the next stage.
    pub fn counterpick_stage(
        &self,
        token: PhaseToken,
        player: UserId,
        stage: StageId,
    ) -> Result<Transition, MatchError> {
        self.transition(token, "counterpick stage", |progress| {
            let (winner, loser) = match progress.phase {
                Phase::LoserCounterpicksStage { winner, loser } => (winner, loser),
                ref other => return Err(wrong_phase("counterpick stage", other)),
            };
            if player != loser {
                return Err(MatchError::NotYourTurn {
                    expected: loser,
                    got: player,
                });
            }
            let pool = counterpick_pool(&self.ruleset, loser, &progress.games);
            if !pool.contains(&stage) || progress.current_bans.contains(&stage) {
                return Err(MatchError::StageNotAvailable(stage));
            }

            progress.next_stage = Some(stage);
            if self.settings.track_characters && self.ruleset.stage_before_character() {
                Ok(Step::Advance(Phase::WinnerPicksCharacter { winner, loser }))
            } else {
                self.start_game(progress).map(Step::Advance)
            }
        })
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn transition<F>(
        &self,
        token: PhaseToken,
        operation: &'static str,
        body: F,
    ) -> Result<Transition, MatchError>
    where
        F: FnOnce(&mut MatchProgress) -> Result<Step, MatchError>,
    {
        let mut progress = self.progress.lock();

        if progress.phase.is_completed() {
            error!(operation, token = %token, "Transition attempted on completed match");
            return Err(MatchError::MatchCompleted);
        }
        if token.0 != progress.generation {
            error!(
                operation,
                token = %token,
                current = progress.generation,
                phase = progress.phase.name(),
                "Stale phase token"
            );
            return Err(MatchError::StalePhase {
                got: token.0,
                current: progress.generation,
            });
        }

        let from = progress.phase.name();
        let step = body(&mut *progress).inspect_err(|e| {
            debug!(operation, phase = from, error = %e, "Transition rejected");
        })?;

        progress.generation += 1;
        let (phase, advanced) = match step {
            Step::Advance(phase) => (phase, true),
            Step::Continue(phase) => (phase, false),
        };
        debug!(
            operation,
            from,
            to = phase.name(),
            generation = progress.generation,
            "Phase transition"
        );
        progress.phase = phase.clone();

        let snapshot = PhaseSnapshot {
            token: PhaseToken(progress.generation),
            phase,
        };
        Ok(if advanced {
            Transition::Advanced(snapshot)
        } else {
            Transition::Continue(snapshot)
        })
    }

    fn slot(&self, player: UserId) -> Result<usize, MatchError> {
        self.players
            .iter()
            .position(|p| *p == player)
            .ok_or(MatchError::NotAParticipant(player))
    }

    /// Game 1's stage is settled: blind pick if still owed, otherwise play.
    fn first_stage_selected(
        &self,
        progress: &mut MatchProgress,
        stage: StageId,
    ) -> Result<Phase, MatchError> {
        progress.next_stage = Some(stage);
        if self.settings.track_characters && !progress.blind_picked {
            return Ok(Phase::BlindPick);
        }
        self.start_game(progress)
    }

    fn begin_stage_selection(
        &self,
        progress: &MatchProgress,
        winner: UserId,
        loser: UserId,
    ) -> Phase {
        let pool = counterpick_pool(&self.ruleset, loser, &progress.games);
        let count = effective_ban_count(self.ruleset.stage_bans(), pool.len());
        if count > 0 {
            Phase::WinnerBansStages {
                winner,
                loser,
                count,
            }
        } else {
            Phase::LoserCounterpicksStage { winner, loser }
        }
    }

    fn start_game(&self, progress: &mut MatchProgress) -> Result<Phase, MatchError> {
        let stage = progress.next_stage.ok_or(MatchError::WrongPhase {
            operation: "start game",
            phase: "no stage selected",
        })?;
        progress.selected_stages.push(stage);
        Ok(Phase::InGame {
            game: progress.next_game_number(),
            stage,
        })
    }
}

fn wrong_phase(operation: &'static str, phase: &Phase) -> MatchError {
    MatchError::WrongPhase {
        operation,
        phase: phase.name(),
    }
}
