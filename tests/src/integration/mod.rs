//! Cross-crate integration scenarios.

pub mod choice_waiter;
pub mod full_set;
pub mod match_rules;
pub mod sessions;

#[cfg(test)]
pub(crate) mod support;
