//! Error types for sessions and menus.

use shared_types::{ChatError, ComponentId};
use thiserror::Error;

/// Menu construction errors. A menu that fails validation is never built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MenuError {
    /// Link buttons never produce interactions, so their handler could never run.
    #[error("Component {0} is a link and cannot carry an action")]
    LinkButton(ComponentId),

    /// Two components (or two options) share an id.
    #[error("Duplicate component id {0}")]
    DuplicateId(String),

    /// Nothing for the user to interact with.
    #[error("A menu needs at least one action")]
    NoActions,

    /// More components than the platform can attach to one message.
    #[error("Too many components: {count} (maximum {maximum})")]
    TooManyComponents { count: usize, maximum: usize },

    /// Choice bounds that no sequence of clicks can satisfy.
    #[error("Invalid choice bounds: min {min}, max {max} with {available} choices")]
    InvalidChoiceBounds {
        min: usize,
        max: usize,
        available: usize,
    },
}

/// Errors while displaying a session or running one of its callbacks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The chat platform refused an operation.
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// A user callback reported failure.
    #[error("Callback failed: {0}")]
    Callback(String),
}
