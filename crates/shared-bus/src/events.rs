//! # Interaction Filters
//!
//! Filters used by broadcast subscribers to select the interaction events
//! they care about.

use shared_types::{ChannelId, InteractionEvent, InteractionTopic, MessageId, UserId};

/// Filter for subscribing to specific interaction events.
///
/// Every non-empty criterion must match; empty criteria accept everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<InteractionTopic>,
    /// Channels to include. Empty means all channels.
    pub channels: Vec<ChannelId>,
    /// Target messages to include. Empty means all messages.
    pub messages: Vec<MessageId>,
    /// Acting users to include. Empty means everyone.
    pub users: Vec<UserId>,
    /// Only direct-message events.
    pub direct_only: bool,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<InteractionTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Plain messages only.
    #[must_use]
    pub fn messages_only() -> Self {
        Self::topics(vec![InteractionTopic::Message])
    }

    /// Restrict to events targeting one message.
    #[must_use]
    pub fn on_message(mut self, message: MessageId) -> Self {
        self.messages.push(message);
        self
    }

    /// Restrict to events from the given users.
    #[must_use]
    pub fn from_users(mut self, users: Vec<UserId>) -> Self {
        self.users.extend(users);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &InteractionEvent) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&event.topic());
        let channel_match = self.channels.is_empty() || self.channels.contains(&event.channel_id);
        let message_match = self.messages.is_empty() || self.messages.contains(&event.message_id);
        let user_match = self.users.is_empty() || self.users.contains(&event.user);
        let direct_match = !self.direct_only || event.is_direct();

        topic_match && channel_match && message_match && user_match && direct_match
    }
}
