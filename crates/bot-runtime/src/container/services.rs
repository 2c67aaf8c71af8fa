//! # Bot Container
//!
//! Holds every shared service the flows need. Built once at startup and
//! passed down by `Arc`; nothing here is global.
//!
//! ```text
//! ChatClient ─┐
//! EventBroker ┼─► BotContainer ─► MatchFlow
//! Waiter ─────┤
//! Catalogs ───┤
//! Store ──────┘
//! ```

use crate::adapters::{GuildConfigStore, InMemoryGuildConfigStore};
use crate::container::config::{BotConfig, ConfigError};
use sb_02_choice_collection::MultiPartyChoiceWaiter;
use sb_03_match_rules::{RulesetCatalog, RulesetError, RulesetSource};
use shared_bus::{EventBroker, InMemoryEventBroker};
use shared_types::{Catalog, CatalogError, ChatClient};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Startup failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Stage/character catalog failed to load: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Ruleset catalog failed to load: {0}")]
    Ruleset(#[from] RulesetError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Shared services.
pub struct BotContainer {
    pub config: BotConfig,
    pub chat: Arc<dyn ChatClient>,
    pub broker: Arc<dyn EventBroker>,
    pub waiter: Arc<MultiPartyChoiceWaiter>,
    pub catalog: Arc<Catalog>,
    pub rulesets: Arc<dyn RulesetSource>,
    pub store: Arc<dyn GuildConfigStore>,
}

impl BotContainer {
    /// Build the container with the embedded catalogs, an in-memory broker
    /// and an in-memory guild store.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, an embedded catalog does not
    /// validate, or the default ruleset is unknown.
    pub fn new(config: BotConfig, chat: Arc<dyn ChatClient>) -> Result<Self, ContainerError> {
        config.validate()?;

        let catalog = Catalog::embedded()?;
        let rulesets = RulesetCatalog::embedded(&catalog)?;
        if rulesets.ruleset(&config.default_ruleset).is_none() {
            return Err(ConfigError::UnknownRuleset(config.default_ruleset.clone()).into());
        }
        info!(
            stages = catalog.stages().len(),
            characters = catalog.characters().len(),
            rulesets = rulesets.rulesets().len(),
            default_ruleset = %config.default_ruleset,
            "Catalogs loaded"
        );

        Ok(Self {
            config,
            chat,
            broker: Arc::new(InMemoryEventBroker::new()),
            waiter: Arc::new(MultiPartyChoiceWaiter::new()),
            catalog: Arc::new(catalog),
            rulesets: Arc::new(rulesets),
            store: Arc::new(InMemoryGuildConfigStore::new()),
        })
    }

    /// Replace the guild store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn GuildConfigStore>) -> Self {
        self.store = store;
        self
    }

    /// Stage display name, falling back to the id.
    pub fn stage_name(&self, stage: shared_types::StageId) -> String {
        self.catalog
            .stage(stage)
            .map_or_else(|| stage.to_string(), |s| s.name.clone())
    }
}
