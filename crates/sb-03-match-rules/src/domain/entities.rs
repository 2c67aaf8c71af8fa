//! # Domain Entities
//!
//! Phases, phase tokens and the history a match accumulates.

use serde::{Deserialize, Serialize};
use shared_types::{CharacterId, StageId, UserId};
use std::fmt;

/// Proof that the caller observed a specific phase.
///
/// Every transition consumes the token of the phase it acts on; once the
/// match moves on, older tokens are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseToken(pub(crate) u64);

impl PhaseToken {
    /// Generation this token was issued for.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PhaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Current step of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Both players secretly pick their game 1 characters.
    BlindPick,
    /// Rock-paper-scissors decides who strikes first.
    RpsPending,
    /// `striker` strikes `pattern[round]` starters.
    StrikingStarters { striker: UserId, round: usize },
    /// Game `game` (1-based) is being played on `stage`.
    InGame { game: u32, stage: StageId },
    /// The previous game's winner picks a character.
    WinnerPicksCharacter { winner: UserId, loser: UserId },
    /// The previous game's loser picks a character.
    LoserPicksCharacter { winner: UserId, loser: UserId },
    /// The previous game's winner bans `count` stages.
    WinnerBansStages {
        winner: UserId,
        loser: UserId,
        count: usize,
    },
    /// The previous game's loser picks the next stage.
    LoserCounterpicksStage { winner: UserId, loser: UserId },
    /// `winner` reached the target score.
    Completed { winner: UserId },
}

impl Phase {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::BlindPick => "BlindPick",
            Phase::RpsPending => "RpsPending",
            Phase::StrikingStarters { .. } => "StrikingStarters",
            Phase::InGame { .. } => "InGame",
            Phase::WinnerPicksCharacter { .. } => "WinnerPicksCharacter",
            Phase::LoserPicksCharacter { .. } => "LoserPicksCharacter",
            Phase::WinnerBansStages { .. } => "WinnerBansStages",
            Phase::LoserCounterpicksStage { .. } => "LoserCounterpicksStage",
            Phase::Completed { .. } => "Completed",
        }
    }

    /// Whether the match is over.
    pub fn is_completed(&self) -> bool {
        matches!(self, Phase::Completed { .. })
    }
}

/// A phase together with the token that authorizes acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSnapshot {
    pub token: PhaseToken,
    pub phase: Phase,
}

/// Outcome of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A different phase is now current.
    Advanced(PhaseSnapshot),
    /// Same phase kind continues (next strike round). The old token is spent.
    Continue(PhaseSnapshot),
}

impl Transition {
    /// The new current snapshot.
    pub fn snapshot(&self) -> &PhaseSnapshot {
        match self {
            Transition::Advanced(s) | Transition::Continue(s) => s,
        }
    }

    /// Consume into the new current snapshot.
    pub fn into_snapshot(self) -> PhaseSnapshot {
        match self {
            Transition::Advanced(s) | Transition::Continue(s) => s,
        }
    }
}

/// How stages were removed from consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeKind {
    /// Starter strike before game 1.
    Strike,
    /// Winner's ban before a counterpick.
    Ban,
}

/// One round of strikes or bans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeRecord {
    pub game: u32,
    pub player: UserId,
    pub kind: StrikeKind,
    pub stages: Vec<StageId>,
}

/// A finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// 1-based game number.
    pub number: u32,
    pub stage: StageId,
    /// Characters in player order, when tracked.
    pub characters: [Option<CharacterId>; 2],
    pub winner: UserId,
}

/// Match options chosen when the set starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    /// Wins needed to take the set.
    pub first_to: u32,
    /// Run blind pick and per-game character phases.
    pub track_characters: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            first_to: 2,
            track_characters: true,
        }
    }
}

/// Read-only view of a match for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub ruleset_id: String,
    pub players: [UserId; 2],
    pub first_to: u32,
    /// Wins in player order.
    pub score: [u32; 2],
    pub games: Vec<GameRecord>,
    pub strikes: Vec<StrikeRecord>,
    pub winner: Option<UserId>,
}
