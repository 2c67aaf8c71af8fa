//! # Domain Module
//!
//! Core domain types for match rules.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ruleset;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use ruleset::*;
