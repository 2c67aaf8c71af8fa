//! Port implementations owned by the runtime.

pub mod guild_config;

pub use guild_config::{GuildConfigStore, InMemoryGuildConfigStore, MatchmakingConfig, StoreError};
