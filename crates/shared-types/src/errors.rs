//! # Error Types
//!
//! Errors shared across crates: the chat-platform port and the static catalog.

use thiserror::Error;

/// Errors reported by the chat-platform client.
///
/// The core never interprets these beyond logging them and telling the user
/// to try again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// The target channel no longer exists or is not visible.
    #[error("Unknown channel: {0}")]
    UnknownChannel(u64),

    /// The target message no longer exists.
    #[error("Unknown message: {0}")]
    UnknownMessage(u64),

    /// Missing permission for the requested action.
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    /// The user does not accept direct messages.
    #[error("Cannot message user {0}")]
    CannotMessageUser(u64),

    /// Transport-level failure (HTTP, gateway).
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Errors while loading static reference data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The embedded JSON could not be parsed.
    #[error("Malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two entries share an id.
    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    /// A reference points to an id that is not in the catalog.
    #[error("Unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u32 },
}
