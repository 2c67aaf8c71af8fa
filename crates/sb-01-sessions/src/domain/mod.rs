//! Domain layer: actions, settings, errors and construction invariants.

pub mod action;
pub mod errors;
pub mod invariants;
pub mod settings;
