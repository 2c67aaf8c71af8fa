//! # Interaction Events
//!
//! Everything the platform delivers to the bot that a session or waiter can
//! react to: button clicks, menu selections, and plain messages.

use crate::components::ComponentId;
use crate::entities::{ChannelId, GuildId, MessageId, MessageRef, UserId};
use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    /// A button was clicked.
    ButtonClick { component_id: ComponentId },
    /// One or more values were chosen from a selection menu.
    Selection {
        component_id: ComponentId,
        values: Vec<String>,
    },
    /// A plain text message was posted.
    Message { content: String },
}

impl InteractionKind {
    /// Component id for component interactions.
    pub fn component_id(&self) -> Option<&ComponentId> {
        match self {
            InteractionKind::ButtonClick { component_id }
            | InteractionKind::Selection { component_id, .. } => Some(component_id),
            InteractionKind::Message { .. } => None,
        }
    }
}

/// An incoming event from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Unique per delivery; used to answer the interaction.
    pub interaction_id: u64,
    /// Acting user.
    pub user: UserId,
    /// Channel the event happened in.
    pub channel_id: ChannelId,
    /// For components: the message carrying the component.
    /// For plain messages: the message itself.
    pub message_id: MessageId,
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub kind: InteractionKind,
}

impl InteractionEvent {
    /// Whether this event happened in a private (direct message) channel.
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }

    /// The message this event targets.
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.message_id)
    }

    /// Text content of plain messages.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            InteractionKind::Message { content } => Some(content),
            _ => None,
        }
    }

    /// Whether this is a component event (click or selection).
    pub fn is_component(&self) -> bool {
        self.kind.component_id().is_some()
    }
}

/// Coarse category used for broker filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionTopic {
    Button,
    Selection,
    Message,
}

impl InteractionEvent {
    /// Topic of this event.
    pub fn topic(&self) -> InteractionTopic {
        match self.kind {
            InteractionKind::ButtonClick { .. } => InteractionTopic::Button,
            InteractionKind::Selection { .. } => InteractionTopic::Selection,
            InteractionKind::Message { .. } => InteractionTopic::Message,
        }
    }
}
