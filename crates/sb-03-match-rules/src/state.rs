//! Mutable match progress, guarded by the `MatchState` mutex.

use crate::domain::{GameRecord, Phase, StrikeRecord};
use shared_types::{CharacterId, StageId};

pub(crate) struct MatchProgress {
    /// Bumped on every successful transition.
    pub generation: u64,
    pub phase: Phase,
    /// Finished games, in order.
    pub games: Vec<GameRecord>,
    /// Starter strikes and winner bans, in order.
    pub strikes: Vec<StrikeRecord>,
    /// Stage of every started game, in order.
    pub selected_stages: Vec<StageId>,
    /// Starter indices struck before game 1.
    pub struck_starters: Vec<usize>,
    /// Stage chosen for the game about to start.
    pub next_stage: Option<StageId>,
    /// Characters for the game about to start, in player order.
    pub next_characters: [Option<CharacterId>; 2],
    /// Bans placed since the last game.
    pub current_bans: Vec<StageId>,
    pub blind_picked: bool,
}

impl MatchProgress {
    pub fn new(phase: Phase) -> Self {
        Self {
            generation: 0,
            phase,
            games: Vec::new(),
            strikes: Vec::new(),
            selected_stages: Vec::new(),
            struck_starters: Vec::new(),
            next_stage: None,
            next_characters: [None, None],
            current_bans: Vec::new(),
            blind_picked: false,
        }
    }

    /// Number of the next game to be played (1-based).
    pub fn next_game_number(&self) -> u32 {
        u32::try_from(self.games.len()).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// Wins per player slot.
    pub fn score(&self, players: &[shared_types::UserId; 2]) -> [u32; 2] {
        let mut score = [0u32; 2];
        for game in &self.games {
            if let Some(slot) = players.iter().position(|p| *p == game.winner) {
                score[slot] += 1;
            }
        }
        score
    }
}
