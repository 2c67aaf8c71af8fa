//! # Ruleset
//!
//! Immutable description of a match format: stage pools, the starter strike
//! procedure, post-game bans and the active DSR variant.

use super::errors::RulesetError;
use super::invariants::{
    invariant_bans_below_total, invariant_distinct_stages, invariant_has_starters,
    invariant_strike_pattern,
};
use serde::{Deserialize, Serialize};
use shared_types::StageId;
use std::fmt;

/// "Dave's Stupid Rule" variants: which stages a counterpicking player may
/// not return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DsrMode {
    /// No restriction.
    None,
    /// The stage the counterpicker most recently won on is excluded.
    ModifiedDsr,
    /// Every stage the counterpicker has won on is excluded.
    WinnersVariation,
    /// Every stage already played in the set is excluded.
    GameRestricted,
    /// The counterpicker's won stages and the previous game's stage are excluded.
    StageDismissalRule,
}

impl fmt::Display for DsrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DsrMode::None => "no DSR",
            DsrMode::ModifiedDsr => "modified DSR",
            DsrMode::WinnersVariation => "DSR (winners variation)",
            DsrMode::GameRestricted => "DSR (game restricted)",
            DsrMode::StageDismissalRule => "stage dismissal rule",
        };
        f.write_str(name)
    }
}

/// Unvalidated ruleset fields, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetParams {
    /// Stable id used by guild configuration.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Stages struck before game 1, in display order.
    pub starters: Vec<StageId>,
    /// Additional stages available from game 2 on.
    #[serde(default)]
    pub counterpicks: Vec<StageId>,
    pub dsr_mode: DsrMode,
    /// Stages the previous game's winner bans before each counterpick.
    pub stage_bans: usize,
    /// Stages struck per round, alternating strikers.
    pub starter_strike_pattern: Vec<usize>,
    /// After game 1: settle the stage before characters.
    #[serde(default = "default_true")]
    pub stage_before_character: bool,
    /// Game 1: blind character pick before striking.
    #[serde(default = "default_true")]
    pub blind_pick_before_stage: bool,
}

fn default_true() -> bool {
    true
}

/// A validated, immutable ruleset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    params: RulesetParams,
}

impl Ruleset {
    /// Validate and build a ruleset.
    ///
    /// # Errors
    ///
    /// Any violated invariant; nothing is partially constructed.
    pub fn new(params: RulesetParams) -> Result<Self, RulesetError> {
        let id = params.id.as_str();
        invariant_has_starters(id, &params.starters)?;
        invariant_distinct_stages(id, &params.starters, &params.counterpicks)?;
        invariant_bans_below_total(
            id,
            params.stage_bans,
            params.starters.len() + params.counterpicks.len(),
        )?;
        invariant_strike_pattern(id, &params.starter_strike_pattern, params.starters.len())?;
        Ok(Self { params })
    }

    pub fn id(&self) -> &str {
        &self.params.id
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn starters(&self) -> &[StageId] {
        &self.params.starters
    }

    pub fn counterpicks(&self) -> &[StageId] {
        &self.params.counterpicks
    }

    pub fn dsr_mode(&self) -> DsrMode {
        self.params.dsr_mode
    }

    pub fn stage_bans(&self) -> usize {
        self.params.stage_bans
    }

    pub fn starter_strike_pattern(&self) -> &[usize] {
        &self.params.starter_strike_pattern
    }

    pub fn stage_before_character(&self) -> bool {
        self.params.stage_before_character
    }

    pub fn blind_pick_before_stage(&self) -> bool {
        self.params.blind_pick_before_stage
    }

    /// Starters followed by counterpicks: the pool from game 2 on.
    pub fn all_stages(&self) -> Vec<StageId> {
        self.params
            .starters
            .iter()
            .chain(&self.params.counterpicks)
            .copied()
            .collect()
    }

    /// Total stage count across both pools.
    pub fn total_stages(&self) -> usize {
        self.params.starters.len() + self.params.counterpicks.len()
    }

    /// Highest first-to score the DSR mode can support, `None` when uncapped.
    ///
    /// Winner-based variants run out of stages after one win per stage;
    /// game-restricted runs out after every stage has been played once.
    pub fn maximum_first_to_what_score(&self) -> Option<u32> {
        let total = u32::try_from(self.total_stages()).unwrap_or(u32::MAX);
        match self.params.dsr_mode {
            DsrMode::None | DsrMode::ModifiedDsr => None,
            DsrMode::WinnersVariation | DsrMode::StageDismissalRule => Some(total),
            DsrMode::GameRestricted => {
                let oddified = if total % 2 == 0 { total - 1 } else { total };
                Some((oddified + 1) / 2)
            }
        }
    }

    /// The raw fields this ruleset was built from.
    pub fn params(&self) -> &RulesetParams {
        &self.params
    }
}
