//! # Ports
//!
//! Where the match rules get their rulesets from.

pub mod outbound;

pub use outbound::RulesetSource;
