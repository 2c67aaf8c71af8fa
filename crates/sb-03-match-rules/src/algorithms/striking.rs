//! # Starter Striking
//!
//! Validation of one strike round and selection of the surviving starter.

use crate::domain::MatchError;
use shared_types::StageId;

/// Check a strike round: exact count, indices in range, nothing struck twice.
pub fn validate_strike(
    indices: &[usize],
    expected: usize,
    starter_count: usize,
    already_struck: &[usize],
) -> Result<(), MatchError> {
    if indices.len() != expected {
        return Err(MatchError::WrongStageCount {
            expected,
            got: indices.len(),
        });
    }
    for (i, &index) in indices.iter().enumerate() {
        if index >= starter_count {
            return Err(MatchError::StarterOutOfRange {
                index,
                len: starter_count,
            });
        }
        if already_struck.contains(&index) || indices[..i].contains(&index) {
            return Err(MatchError::AlreadyStruck(index));
        }
    }
    Ok(())
}

/// Lowest starter index not struck in any round.
pub fn remaining_starter(starter_count: usize, struck: &[usize]) -> Option<usize> {
    (0..starter_count).find(|i| !struck.contains(i))
}

/// Starters still standing, with their indices, in ruleset order.
pub fn unstruck_starters(starters: &[StageId], struck: &[usize]) -> Vec<(usize, StageId)> {
    starters
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| !struck.contains(i))
        .collect()
}
