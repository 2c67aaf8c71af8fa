//! # Guild Configuration Store
//!
//! Per-guild settings: the matchmaking role and channel, and a ruleset that
//! overrides whatever a match request asks for.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ChannelId, GuildId, RoleId};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Who gets pinged for matchmaking, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchmakingConfig {
    pub role: RoleId,
    /// Restricts matchmaking to one channel when set.
    pub channel: Option<ChannelId>,
}

/// Store failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Guild config backend unavailable: {0}")]
    Unavailable(String),
}

/// Outbound port for per-guild settings.
#[async_trait]
pub trait GuildConfigStore: Send + Sync {
    async fn matchmaking(&self, guild: GuildId) -> Result<Option<MatchmakingConfig>, StoreError>;

    async fn set_matchmaking(
        &self,
        guild: GuildId,
        config: MatchmakingConfig,
    ) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn clear_matchmaking(&self, guild: GuildId) -> Result<bool, StoreError>;

    /// Ruleset id every match in the guild must use.
    async fn forced_ruleset(&self, guild: GuildId) -> Result<Option<String>, StoreError>;

    /// `None` lifts the restriction.
    async fn set_forced_ruleset(
        &self,
        guild: GuildId,
        ruleset: Option<String>,
    ) -> Result<(), StoreError>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryGuildConfigStore {
    matchmaking: RwLock<HashMap<GuildId, MatchmakingConfig>>,
    forced_rulesets: RwLock<HashMap<GuildId, String>>,
}

impl InMemoryGuildConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GuildConfigStore for InMemoryGuildConfigStore {
    async fn matchmaking(&self, guild: GuildId) -> Result<Option<MatchmakingConfig>, StoreError> {
        Ok(self.matchmaking.read().get(&guild).copied())
    }

    async fn set_matchmaking(
        &self,
        guild: GuildId,
        config: MatchmakingConfig,
    ) -> Result<(), StoreError> {
        debug!(guild = %guild, role = %config.role, "Matchmaking configured");
        self.matchmaking.write().insert(guild, config);
        Ok(())
    }

    async fn clear_matchmaking(&self, guild: GuildId) -> Result<bool, StoreError> {
        Ok(self.matchmaking.write().remove(&guild).is_some())
    }

    async fn forced_ruleset(&self, guild: GuildId) -> Result<Option<String>, StoreError> {
        Ok(self.forced_rulesets.read().get(&guild).cloned())
    }

    async fn set_forced_ruleset(
        &self,
        guild: GuildId,
        ruleset: Option<String>,
    ) -> Result<(), StoreError> {
        let mut forced = self.forced_rulesets.write();
        match ruleset {
            Some(id) => {
                debug!(guild = %guild, ruleset = %id, "Ruleset forced");
                forced.insert(guild, id);
            }
            None => {
                forced.remove(&guild);
            }
        }
        Ok(())
    }
}
