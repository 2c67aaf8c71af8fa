//! The result handed to completion and timeout callbacks.

use shared_types::UserId;
use std::collections::HashMap;

/// Choices recorded so far, keyed by participant.
///
/// On completion every participant is present. On timeout the missing
/// entries are the participants who never answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedChoices<T> {
    participants: Vec<UserId>,
    choices: HashMap<UserId, T>,
}

impl<T> CollectedChoices<T> {
    pub(crate) fn new(participants: Vec<UserId>, choices: HashMap<UserId, T>) -> Self {
        Self {
            participants,
            choices,
        }
    }

    /// Participants in the order they were given.
    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }

    /// Choice of one participant.
    pub fn get(&self, user: UserId) -> Option<&T> {
        self.choices.get(&user)
    }

    /// Participants without a choice, in order.
    pub fn missing(&self) -> Vec<UserId> {
        self.participants
            .iter()
            .filter(|u| !self.choices.contains_key(u))
            .copied()
            .collect()
    }

    /// Whether every participant chose.
    pub fn is_complete(&self) -> bool {
        self.participants
            .iter()
            .all(|u| self.choices.contains_key(u))
    }

    /// Number of recorded choices.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Choices in participant order, or `None` if anyone is missing.
    pub fn into_complete(mut self) -> Option<Vec<T>> {
        self.participants
            .iter()
            .map(|u| self.choices.remove(u))
            .collect()
    }
}
