//! # DSR Exclusions
//!
//! Computes which stages a counterpicking player may not choose under each
//! DSR variant, and how many bans the winner may place.

use crate::domain::{DsrMode, GameRecord, Ruleset};
use shared_types::{StageId, UserId};

/// Stages excluded for `counterpicker`, in first-seen order, without repeats.
pub fn dsr_excluded(mode: DsrMode, counterpicker: UserId, games: &[GameRecord]) -> Vec<StageId> {
    let won_by_counterpicker = || {
        games
            .iter()
            .filter(|g| g.winner == counterpicker)
            .map(|g| g.stage)
    };

    let candidates: Vec<StageId> = match mode {
        DsrMode::None => Vec::new(),
        DsrMode::ModifiedDsr => won_by_counterpicker().last().into_iter().collect(),
        DsrMode::WinnersVariation => won_by_counterpicker().collect(),
        DsrMode::GameRestricted => games.iter().map(|g| g.stage).collect(),
        DsrMode::StageDismissalRule => won_by_counterpicker()
            .chain(games.last().map(|g| g.stage))
            .collect(),
    };

    let mut excluded = Vec::with_capacity(candidates.len());
    for stage in candidates {
        if !excluded.contains(&stage) {
            excluded.push(stage);
        }
    }
    excluded
}

/// Stages the counterpicker may choose from before bans.
///
/// Starters followed by counterpicks, minus DSR exclusions. If the exclusions
/// would empty the pool the unrestricted pool is offered instead.
pub fn counterpick_pool(
    ruleset: &Ruleset,
    counterpicker: UserId,
    games: &[GameRecord],
) -> Vec<StageId> {
    let excluded = dsr_excluded(ruleset.dsr_mode(), counterpicker, games);
    let pool = ruleset.all_stages();
    let allowed: Vec<StageId> = pool
        .iter()
        .copied()
        .filter(|s| !excluded.contains(s))
        .collect();
    if allowed.is_empty() {
        pool
    } else {
        allowed
    }
}

/// Bans the winner places: never so many that nothing is left to pick.
pub fn effective_ban_count(stage_bans: usize, available: usize) -> usize {
    stage_bans.min(available.saturating_sub(1))
}
