//! # Core Domain Entities
//!
//! Identifiers and reference data shared by every SetBot crate.
//!
//! ## Clusters
//!
//! - **Platform identity**: `UserId`, `ChannelId`, `MessageId`, `GuildId`, `MessageRef`
//! - **Game reference data**: `Stage`, `Character`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: PLATFORM IDENTITY
// =============================================================================

/// A chat-platform user (snowflake id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// A text channel or direct-message channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// A single rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

/// A guild (server). Direct messages carry no guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuildId(pub u64);

/// A role inside a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub u64);

macro_rules! display_snowflake {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_snowflake!(UserId, ChannelId, MessageId, GuildId, RoleId);

impl UserId {
    /// Platform mention markup for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

/// Reference to a rendered message: the channel it lives in plus its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Channel holding the message.
    pub channel_id: ChannelId,
    /// The message itself.
    pub message_id: MessageId,
}

impl MessageRef {
    /// Create a new message reference.
    pub fn new(channel_id: ChannelId, message_id: MessageId) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

// =============================================================================
// CLUSTER B: GAME REFERENCE DATA
// =============================================================================

/// Stage identifier as used in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageId(pub u32);

/// Character identifier as used in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage#{}", self.0)
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character#{}", self.0)
    }
}

/// A legal stage. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stage {
    /// Catalog id.
    pub id: StageId,
    /// Display name.
    pub name: String,
    /// Auxiliary media id (stage preview image).
    pub media_id: Option<String>,
}

/// A playable character. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Character {
    /// Catalog id.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Lowercase alternative names accepted in text replies.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Auxiliary media id (stock icon emoji).
    pub media_id: Option<String>,
}

impl Character {
    /// Whether `query` names this character (case-insensitive, name or alias).
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.name.to_lowercase() == query || self.aliases.iter().any(|a| *a == query)
    }
}
