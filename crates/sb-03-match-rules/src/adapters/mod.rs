//! # Adapters
//!
//! Concrete ruleset sources.

pub mod ruleset_catalog;

pub use ruleset_catalog::RulesetCatalog;
