//! # Ruleset Catalog
//!
//! Built-in rulesets, embedded at build time and validated against the stage
//! catalog on load.

use crate::domain::{Ruleset, RulesetError, RulesetParams};
use crate::ports::RulesetSource;
use shared_types::Catalog;
use std::sync::Arc;
use tracing::debug;

const RULESETS_JSON: &str = include_str!("../../data/rulesets.json");

/// Immutable set of validated rulesets.
#[derive(Debug, Clone)]
pub struct RulesetCatalog {
    rulesets: Vec<Arc<Ruleset>>,
}

impl RulesetCatalog {
    /// Load the embedded rulesets.
    pub fn embedded(stages: &Catalog) -> Result<Self, RulesetError> {
        Self::from_json(RULESETS_JSON, stages)
    }

    /// Load rulesets from a JSON array.
    pub fn from_json(json: &str, stages: &Catalog) -> Result<Self, RulesetError> {
        let params: Vec<RulesetParams> = serde_json::from_str(json)?;
        Self::new(params, stages)
    }

    /// Validate every ruleset and check its stages exist.
    pub fn new(params: Vec<RulesetParams>, stages: &Catalog) -> Result<Self, RulesetError> {
        let mut rulesets: Vec<Arc<Ruleset>> = Vec::with_capacity(params.len());
        for p in params {
            if rulesets.iter().any(|r| r.id() == p.id) {
                return Err(RulesetError::DuplicateRuleset(p.id));
            }
            if let Some(stage) = p
                .starters
                .iter()
                .chain(&p.counterpicks)
                .find(|s| stages.stage(**s).is_none())
            {
                return Err(RulesetError::UnknownStage {
                    id: p.id.clone(),
                    stage: *stage,
                });
            }
            let ruleset = Ruleset::new(p)?;
            debug!(
                ruleset = ruleset.id(),
                dsr = %ruleset.dsr_mode(),
                stages = ruleset.total_stages(),
                "Ruleset loaded"
            );
            rulesets.push(Arc::new(ruleset));
        }
        Ok(Self { rulesets })
    }

    /// All rulesets in catalog order.
    pub fn rulesets(&self) -> &[Arc<Ruleset>] {
        &self.rulesets
    }
}

impl RulesetSource for RulesetCatalog {
    fn ruleset(&self, id: &str) -> Option<Arc<Ruleset>> {
        self.rulesets.iter().find(|r| r.id() == id).cloned()
    }

    fn ruleset_ids(&self) -> Vec<String> {
        self.rulesets.iter().map(|r| r.id().to_string()).collect()
    }
}
