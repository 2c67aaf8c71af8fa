//! # Orchestration Handlers
//!
//! Flows that turn the match rules into prompts and prompts back into
//! transitions.

pub mod match_flow;
pub mod rps;

pub use match_flow::{FlowError, MatchFlow, MatchHandle, MatchOutcome, MatchRequest};
pub use rps::{duel, Rps};
