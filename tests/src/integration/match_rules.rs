//! # Match Rule Scenarios
//!
//! Whole sets played against the built-in rulesets and the stage catalog.

#[cfg(test)]
mod tests {
    use sb_03_match_rules::{
        DsrMode, MatchError, MatchSettings, MatchState, Phase, RulesetCatalog, RulesetSource,
        StrikeKind,
    };
    use shared_types::{Catalog, CharacterId, StageId, UserId};
    use std::sync::Arc;
    use std::thread;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const A: UserId = UserId(100);
    const B: UserId = UserId(200);

    fn catalog() -> RulesetCatalog {
        RulesetCatalog::embedded(&Catalog::embedded().unwrap()).unwrap()
    }

    fn start(ruleset: &str, settings: MatchSettings) -> MatchState {
        let ruleset = catalog().ruleset(ruleset).unwrap();
        MatchState::new(ruleset, [A, B], settings).unwrap()
    }

    /// Plays the current phase with the first legal move. `winners` decides
    /// each game in order. Returns false once the set is over.
    fn step(state: &MatchState, winners: &[UserId]) -> bool {
        let snapshot = state.current();
        let token = snapshot.token;
        let result = match snapshot.phase {
            Phase::BlindPick => state.submit_blind_picks(token, [CharacterId(1), CharacterId(7)]),
            Phase::RpsPending => state.resolve_rps(token, A),
            Phase::StrikingStarters { striker, round } => {
                let count = state.ruleset().starter_strike_pattern()[round];
                let indices: Vec<usize> = state
                    .unstruck_starters()
                    .into_iter()
                    .take(count)
                    .map(|(index, _)| index)
                    .collect();
                state.strike(token, striker, &indices)
            }
            Phase::InGame { game, .. } => state.report_winner(token, winners[game as usize - 1]),
            Phase::WinnerPicksCharacter { winner, .. } => {
                state.pick_character(token, winner, CharacterId(3))
            }
            Phase::LoserPicksCharacter { loser, .. } => {
                state.pick_character(token, loser, CharacterId(8))
            }
            Phase::WinnerBansStages { winner, count, .. } => {
                let bans: Vec<StageId> = state.stage_options().into_iter().take(count).collect();
                state.ban_stages(token, winner, &bans)
            }
            Phase::LoserCounterpicksStage { loser, .. } => {
                let pick = state.stage_options()[0];
                state.counterpick_stage(token, loser, pick)
            }
            Phase::Completed { .. } => return false,
        };
        result.unwrap();
        true
    }

    fn play_out(state: &MatchState, winners: &[UserId]) {
        for _ in 0..200 {
            if !step(state, winners) {
                return;
            }
        }
        panic!("set did not finish");
    }

    fn advance_until(state: &MatchState, winners: &[UserId], stop: impl Fn(&Phase) -> bool) {
        for _ in 0..200 {
            if stop(&state.current().phase) {
                return;
            }
            assert!(step(state, winners), "set finished early");
        }
        panic!("phase never reached");
    }

    // =========================================================================
    // BUILT-IN RULESETS
    // =========================================================================

    #[test]
    fn test_every_builtin_ruleset_plays_a_full_set() {
        let rulesets = catalog();
        assert!(!rulesets.ruleset_ids().is_empty());

        for ruleset in rulesets.rulesets() {
            let first_to = ruleset
                .maximum_first_to_what_score()
                .map_or(2, |max| max.min(2));
            let state = MatchState::new(
                Arc::clone(ruleset),
                [A, B],
                MatchSettings {
                    first_to,
                    track_characters: true,
                },
            )
            .unwrap();
            // B, A, B, ...
            let winners: Vec<UserId> = (0..8).map(|g| if g % 2 == 0 { B } else { A }).collect();
            play_out(&state, &winners);

            let summary = state.summary();
            assert_eq!(summary.ruleset_id, ruleset.id());
            assert_eq!(summary.score.iter().max(), Some(&first_to), "{}", ruleset.id());
            assert!(summary.winner.is_some());
            assert_eq!(summary.games.len() as u32, summary.score.iter().sum::<u32>());
            assert!(summary.games.iter().all(|g| g.characters.iter().all(Option::is_some)));

            // Game 1 is always on a starter.
            assert!(ruleset.starters().contains(&summary.games[0].stage));
            for game in &summary.games[1..] {
                assert!(ruleset.all_stages().contains(&game.stage));
            }
        }
    }

    #[test]
    fn test_game_restricted_never_repeats_a_stage() {
        let state = start(
            "game-restricted",
            MatchSettings {
                first_to: 2,
                track_characters: false,
            },
        );
        assert_eq!(state.ruleset().dsr_mode(), DsrMode::GameRestricted);
        play_out(&state, &[A, B, A]);

        let stages = state.selected_stages();
        assert_eq!(stages.len(), 3);
        for (i, stage) in stages.iter().enumerate() {
            assert!(!stages[..i].contains(stage), "{stage} repeated");
        }
    }

    #[test]
    fn test_modified_dsr_blocks_each_players_latest_win() {
        let state = start(
            "standard",
            MatchSettings {
                first_to: 3,
                track_characters: false,
            },
        );
        let winners = [A, B, A, B, A];

        // Game 1 lands on the one starter nobody struck.
        advance_until(&state, &winners, |p| matches!(p, Phase::InGame { game: 2, .. }));
        let first = state.selected_stages()[0];

        // Game 3: A counterpicks and may not return to their game 1 win.
        advance_until(&state, &winners, |p| {
            matches!(p, Phase::LoserCounterpicksStage { loser, .. } if *loser == A)
        });
        let options = state.stage_options();
        assert!(!options.is_empty());
        assert!(!options.contains(&first));

        // Game 4: B counterpicks and may not return to their game 2 win.
        let second = state.selected_stages()[1];
        advance_until(&state, &winners, |p| {
            matches!(p, Phase::LoserCounterpicksStage { loser, .. } if *loser == B)
        });
        assert!(!state.stage_options().contains(&second));

        play_out(&state, &winners);
        let summary = state.summary();
        assert_eq!(summary.winner, Some(A));
        assert_eq!(summary.score, [3, 2]);

        // Two bans before each of games 2 through 5, after the three strike rounds.
        let bans = summary
            .strikes
            .iter()
            .filter(|s| s.kind == StrikeKind::Ban)
            .count();
        assert_eq!(bans, 4);
        assert!(summary
            .strikes
            .iter()
            .filter(|s| s.kind == StrikeKind::Ban)
            .all(|s| s.stages.len() == 2));
    }

    #[test]
    fn test_counterpick_outside_the_pool_is_rejected() {
        let state = start(
            "casual",
            MatchSettings {
                first_to: 2,
                track_characters: false,
            },
        );
        let winners = [A, A];
        advance_until(&state, &winners, |p| {
            matches!(p, Phase::LoserCounterpicksStage { .. })
        });

        let token = state.current().token;
        // Lylat Cruise is not part of the casual ruleset.
        assert_eq!(
            state.counterpick_stage(token, B, StageId(8)).err(),
            Some(MatchError::StageNotAvailable(StageId(8)))
        );
        assert!(matches!(
            state.counterpick_stage(token, A, StageId(3)),
            Err(MatchError::NotYourTurn { expected: B, got: A })
        ));
        // Rejections leave the token usable.
        state.counterpick_stage(token, B, StageId(3)).unwrap();
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[test]
    fn test_racing_reports_record_one_game() {
        let state = Arc::new(start(
            "casual",
            MatchSettings {
                first_to: 2,
                track_characters: false,
            },
        ));
        advance_until(&state, &[A, A], |p| matches!(p, Phase::InGame { .. }));
        let token = state.current().token;

        let reporters: Vec<_> = (0..8)
            .map(|i| {
                let state = Arc::clone(&state);
                let winner = if i % 2 == 0 { A } else { B };
                thread::spawn(move || state.report_winner(token, winner).is_ok())
            })
            .collect();
        let successes = reporters
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(state.summary().games.len(), 1);
        assert_eq!(state.score().iter().sum::<u32>(), 1);
    }
}
