//! # Domain Errors
//!
//! Error types for rulesets and match progression.
//!
//! Both families are contract violations: a `RulesetError` means bad
//! configuration, a `MatchError` means the caller is out of sync with the
//! match (stale UI, double click, wrong player).

use shared_types::{StageId, UserId};
use thiserror::Error;

/// Ruleset construction and loading errors.
#[derive(Debug, Error)]
pub enum RulesetError {
    /// A ruleset needs at least one starter stage.
    #[error("Ruleset {id} has no starter stages")]
    NoStarters {
        /// Ruleset id
        id: String,
    },

    /// Bans must leave at least one stage to play on.
    #[error("Ruleset {id} bans {bans} of {total} stages")]
    TooManyBans {
        /// Ruleset id
        id: String,
        /// Configured stage bans
        bans: usize,
        /// Starters plus counterpicks
        total: usize,
    },

    /// The strike procedure must leave exactly one starter.
    #[error("Ruleset {id} strike pattern strikes {sum} stages, expected {expected}")]
    StrikePatternMismatch {
        /// Ruleset id
        id: String,
        /// Sum of the strike pattern
        sum: usize,
        /// Starters minus one
        expected: usize,
    },

    /// Every strike round strikes at least one stage.
    #[error("Ruleset {id} strike round {round} strikes no stages")]
    EmptyStrikeRound {
        /// Ruleset id
        id: String,
        /// Zero-based round index
        round: usize,
    },

    /// A stage appears twice across the pools.
    #[error("Ruleset {id} lists {stage} more than once")]
    DuplicateStage {
        /// Ruleset id
        id: String,
        /// The repeated stage
        stage: StageId,
    },

    /// A stage is missing from the catalog.
    #[error("Ruleset {id} references unknown {stage}")]
    UnknownStage {
        /// Ruleset id
        id: String,
        /// The missing stage
        stage: StageId,
    },

    /// Two rulesets share an id.
    #[error("Duplicate ruleset id {0}")]
    DuplicateRuleset(String),

    /// The embedded JSON could not be parsed.
    #[error("Malformed ruleset data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Match progression errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The phase token was issued for a phase that has since been replaced.
    #[error("Stale phase token {got} (current {current})")]
    StalePhase {
        /// Token generation presented
        got: u64,
        /// Current generation
        current: u64,
    },

    /// The operation does not apply to the current phase.
    #[error("Cannot {operation} during {phase}")]
    WrongPhase {
        /// Attempted operation
        operation: &'static str,
        /// Current phase name
        phase: &'static str,
    },

    /// The match already has a winner.
    #[error("Match already completed")]
    MatchCompleted,

    /// The user is not one of the two players.
    #[error("User {0} is not playing this match")]
    NotAParticipant(UserId),

    /// The acting player is not the one whose turn it is.
    #[error("It is {expected}'s turn, not {got}'s")]
    NotYourTurn {
        /// Player whose turn it is
        expected: UserId,
        /// Player who acted
        got: UserId,
    },

    /// Wrong number of stages struck or banned.
    #[error("Expected {expected} stages, got {got}")]
    WrongStageCount {
        /// Required count
        expected: usize,
        /// Presented count
        got: usize,
    },

    /// Starter index outside the starter list.
    #[error("Starter index {index} out of range (0..{len})")]
    StarterOutOfRange {
        /// Presented index
        index: usize,
        /// Number of starters
        len: usize,
    },

    /// Starter already struck in this or an earlier round.
    #[error("Starter {0} was already struck")]
    AlreadyStruck(usize),

    /// Stage is not among the currently offered stages.
    #[error("{0} is not available")]
    StageNotAvailable(StageId),

    /// Both player slots hold the same user.
    #[error("A match needs two different players")]
    SamePlayers,

    /// Requested first-to score is zero or above the ruleset cap.
    #[error("First to {requested} is not allowed (maximum {maximum:?})")]
    InvalidFirstTo {
        /// Requested target score
        requested: u32,
        /// Ruleset cap, if any
        maximum: Option<u32>,
    },
}
