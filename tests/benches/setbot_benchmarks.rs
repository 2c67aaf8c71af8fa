//! # SetBot Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | sb-03 Match Rules | Load and validate built-in rulesets | < 1ms |
//! | sb-03 Match Rules | Full set, strikes to final report | < 1ms |
//! | sb-03 Match Rules | Counterpick pool with DSR history | < 10µs |
//! | sb-02 Choice Collection | Register and complete a wait | < 50µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use sb_02_choice_collection::{ChoiceScope, MultiPartyChoiceWaiter, WaitRequest};
use sb_03_match_rules::algorithms::dsr::counterpick_pool;
use sb_03_match_rules::{
    DsrMode, GameRecord, MatchSettings, MatchState, Phase, RulesetCatalog, RulesetSource,
};
use shared_types::{
    Catalog, ChannelId, InteractionEvent, InteractionKind, MessageId, StageId, UserId,
};
use std::sync::Arc;
use std::time::Duration;

const A: UserId = UserId(1);
const B: UserId = UserId(2);

// ============================================================================
// SB-03: Ruleset Loading
// ============================================================================

fn bench_ruleset_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("sb-03-ruleset-loading");
    let stages = Catalog::embedded().unwrap();

    group.bench_function("embedded_catalog", |b| {
        b.iter(|| black_box(RulesetCatalog::embedded(&stages).unwrap()))
    });

    group.finish();
}

// ============================================================================
// SB-03: Match Progression
// ============================================================================

/// Random strikes, random winners, first legal counterpick.
fn play_set(state: &MatchState, rng: &mut impl rand::Rng) {
    loop {
        let snapshot = state.current();
        let token = snapshot.token;
        let result = match snapshot.phase {
            Phase::BlindPick | Phase::WinnerPicksCharacter { .. } | Phase::LoserPicksCharacter { .. } => {
                unreachable!("characters are not tracked")
            }
            Phase::RpsPending => state.resolve_rps(token, A),
            Phase::StrikingStarters { striker, round } => {
                let count = state.ruleset().starter_strike_pattern()[round];
                let mut open: Vec<usize> =
                    state.unstruck_starters().into_iter().map(|(i, _)| i).collect();
                open.shuffle(rng);
                open.truncate(count);
                state.strike(token, striker, &open)
            }
            Phase::InGame { .. } => state.report_winner(token, if rng.gen() { A } else { B }),
            Phase::WinnerBansStages { winner, count, .. } => {
                let bans: Vec<StageId> = state.stage_options().into_iter().take(count).collect();
                state.ban_stages(token, winner, &bans)
            }
            Phase::LoserCounterpicksStage { loser, .. } => {
                state.counterpick_stage(token, loser, state.stage_options()[0])
            }
            Phase::Completed { .. } => return,
        };
        result.unwrap();
    }
}

fn bench_full_sets(c: &mut Criterion) {
    let mut group = c.benchmark_group("sb-03-full-set");
    let rulesets = RulesetCatalog::embedded(&Catalog::embedded().unwrap()).unwrap();
    let mut rng = rand::thread_rng();

    for id in ["standard", "stage-dismissal", "casual"] {
        let ruleset = rulesets.ruleset(id).unwrap();
        group.bench_with_input(BenchmarkId::new("first_to_3", id), &ruleset, |b, ruleset| {
            b.iter(|| {
                let state = MatchState::new(
                    Arc::clone(ruleset),
                    [A, B],
                    MatchSettings {
                        first_to: ruleset.maximum_first_to_what_score().map_or(3, |m| m.min(3)),
                        track_characters: false,
                    },
                )
                .unwrap();
                play_set(&state, &mut rng);
                black_box(state.summary())
            })
        });
    }

    group.finish();
}

fn bench_counterpick_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("sb-03-counterpick-pool");
    let rulesets = RulesetCatalog::embedded(&Catalog::embedded().unwrap()).unwrap();
    let history: Vec<GameRecord> = (1..=8)
        .map(|number| GameRecord {
            number,
            stage: StageId(number),
            characters: [None, None],
            winner: if number % 2 == 0 { A } else { B },
        })
        .collect();

    for ruleset in rulesets.rulesets() {
        if ruleset.dsr_mode() == DsrMode::None {
            continue;
        }
        group.bench_with_input(
            BenchmarkId::new("eight_games", ruleset.id()),
            ruleset,
            |b, ruleset| b.iter(|| black_box(counterpick_pool(ruleset, A, &history))),
        );
    }

    group.finish();
}

// ============================================================================
// SB-02: Choice Collection
// ============================================================================

fn message(user: u64, content: &str) -> InteractionEvent {
    InteractionEvent {
        interaction_id: user,
        user: UserId(user),
        channel_id: ChannelId(1_000_000 + user),
        message_id: MessageId(user),
        guild_id: None,
        kind: InteractionKind::Message {
            content: content.to_string(),
        },
    }
}

fn bench_choice_waiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("sb-02-choice-waiter");
    group.measurement_time(Duration::from_secs(5));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    for participants in [2u64, 8, 32] {
        let answers: Vec<InteractionEvent> =
            (1..=participants).map(|u| message(u, "ready")).collect();
        group.throughput(Throughput::Elements(participants));
        group.bench_with_input(
            BenchmarkId::new("wait_and_complete", participants),
            &answers,
            |b, answers| {
                b.iter(|| {
                    runtime.block_on(async {
                        let waiter = MultiPartyChoiceWaiter::new();
                        waiter
                            .wait_for_choices(WaitRequest::new(
                                answers.iter().map(|e| e.user).collect(),
                                ChoiceScope::DirectMessage,
                                |event| async move { event.content().map(str::len) },
                                |choices| async move {
                                    black_box(choices.len());
                                },
                            ))
                            .unwrap();
                        for event in answers {
                            waiter.handle_event(event.clone()).await;
                        }
                        black_box(waiter.active_waits())
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ruleset_loading,
    bench_full_sets,
    bench_counterpick_pool,
    bench_choice_waiter,
);

criterion_main!(benches);
