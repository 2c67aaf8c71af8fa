//! # Domain Invariants
//!
//! Construction rules every ruleset must satisfy.

use super::errors::RulesetError;
use shared_types::StageId;
use std::collections::HashSet;

/// Invariant: at least one starter stage.
pub fn invariant_has_starters(id: &str, starters: &[StageId]) -> Result<(), RulesetError> {
    if starters.is_empty() {
        return Err(RulesetError::NoStarters { id: id.to_string() });
    }
    Ok(())
}

/// Invariant: bans leave at least one stage.
///
/// `stage_bans < starters + counterpicks`
pub fn invariant_bans_below_total(
    id: &str,
    stage_bans: usize,
    total: usize,
) -> Result<(), RulesetError> {
    if stage_bans >= total {
        return Err(RulesetError::TooManyBans {
            id: id.to_string(),
            bans: stage_bans,
            total,
        });
    }
    Ok(())
}

/// Invariant: striking leaves exactly one starter.
///
/// `sum(pattern) == starters - 1`, and no round strikes zero stages.
pub fn invariant_strike_pattern(
    id: &str,
    pattern: &[usize],
    starters: usize,
) -> Result<(), RulesetError> {
    if let Some(round) = pattern.iter().position(|&n| n == 0) {
        return Err(RulesetError::EmptyStrikeRound {
            id: id.to_string(),
            round,
        });
    }
    let sum: usize = pattern.iter().sum();
    let expected = starters.saturating_sub(1);
    if sum != expected {
        return Err(RulesetError::StrikePatternMismatch {
            id: id.to_string(),
            sum,
            expected,
        });
    }
    Ok(())
}

/// Invariant: a stage appears in at most one slot across both pools.
pub fn invariant_distinct_stages(
    id: &str,
    starters: &[StageId],
    counterpicks: &[StageId],
) -> Result<(), RulesetError> {
    let mut seen = HashSet::with_capacity(starters.len() + counterpicks.len());
    for stage in starters.iter().chain(counterpicks) {
        if !seen.insert(*stage) {
            return Err(RulesetError::DuplicateStage {
                id: id.to_string(),
                stage: *stage,
            });
        }
    }
    Ok(())
}
