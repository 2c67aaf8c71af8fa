//! # SB-03 Match Rules
//!
//! Rulesets and the best-of-N match state machine.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Validate match formats: starter and counterpick pools, the starter
//!   strike pattern, post-game bans and the DSR variant
//! - Drive a set from rock-paper-scissors through striking, games, bans and
//!   counterpicks to a winner
//! - Reject every transition issued against a phase that has already moved on
//!
//! ## Module Structure
//!
//! ```text
//! sb-03-match-rules/
//! ├── domain/          # Ruleset, DsrMode, Phase, PhaseToken, errors
//! ├── algorithms/      # Strike validation, DSR exclusions
//! ├── ports/           # RulesetSource
//! ├── adapters/        # Embedded RulesetCatalog
//! └── service.rs       # MatchState
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;
mod state;

pub use adapters::RulesetCatalog;
pub use domain::{
    DsrMode, GameRecord, MatchError, MatchSettings, MatchSummary, Phase, PhaseSnapshot,
    PhaseToken, Ruleset, RulesetError, RulesetParams, StrikeKind, StrikeRecord, Transition,
};
pub use ports::RulesetSource;
pub use service::MatchState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
