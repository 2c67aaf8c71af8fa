//! Errors for choice collection.

use crate::domain::scope::ChoiceScope;
use shared_types::UserId;
use thiserror::Error;

/// Why a wait was not registered. No state is created in either case.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WaitRejected {
    /// The participant is already being waited on in this scope.
    #[error("User {user} is already making a choice in {scope}")]
    Busy { user: UserId, scope: ChoiceScope },

    /// Nobody to wait for.
    #[error("A choice wait needs at least one participant")]
    NoParticipants,
}
