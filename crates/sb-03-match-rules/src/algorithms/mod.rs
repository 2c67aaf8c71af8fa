//! # Algorithms
//!
//! Pure functions behind the match state machine.

pub mod dsr;
pub mod striking;

pub use dsr::{counterpick_pool, dsr_excluded, effective_ban_count};
pub use striking::{remaining_starter, unstruck_starters, validate_strike};
