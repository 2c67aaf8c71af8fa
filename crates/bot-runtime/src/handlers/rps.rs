//! Rock-paper-scissors, used to decide who strikes first.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rps {
    Rock,
    Paper,
    Scissors,
}

impl Rps {
    /// Parse a reply. Accepts full names and initials, any case.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "rock" | "r" => Some(Rps::Rock),
            "paper" | "p" => Some(Rps::Paper),
            "scissors" | "s" => Some(Rps::Scissors),
            _ => None,
        }
    }

    pub fn beats(self, other: Rps) -> bool {
        matches!(
            (self, other),
            (Rps::Rock, Rps::Scissors) | (Rps::Paper, Rps::Rock) | (Rps::Scissors, Rps::Paper)
        )
    }
}

impl fmt::Display for Rps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rps::Rock => "rock",
            Rps::Paper => "paper",
            Rps::Scissors => "scissors",
        })
    }
}

/// Index of the winning hand, `None` on a tie.
pub fn duel(hands: [Rps; 2]) -> Option<usize> {
    if hands[0].beats(hands[1]) {
        Some(0)
    } else if hands[1].beats(hands[0]) {
        Some(1)
    } else {
        None
    }
}
