//! # Outbound Ports
//!
//! Dependencies the match rules consume.

use crate::domain::Ruleset;
use std::sync::Arc;

/// Lookup of validated rulesets by id.
pub trait RulesetSource: Send + Sync {
    /// Ruleset with the given id.
    fn ruleset(&self, id: &str) -> Option<Arc<Ruleset>>;

    /// Every known ruleset id, in catalog order.
    fn ruleset_ids(&self) -> Vec<String>;
}
