//! # Chat Client Port
//!
//! The narrow interface the core uses to talk to the chat platform, plus a
//! recording in-memory implementation used by tests and the offline binary.

use crate::components::OutgoingMessage;
use crate::entities::{ChannelId, MessageId, MessageRef, UserId};
use crate::errors::ChatError;
use crate::interaction::InteractionEvent;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Outbound port to the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a new message.
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, ChatError>;

    /// Open (or reuse) a private channel with `user` and post there.
    async fn send_direct_message(
        &self,
        user: UserId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, ChatError>;

    /// Replace content and components of an existing message.
    async fn edit_message(
        &self,
        target: MessageRef,
        message: OutgoingMessage,
    ) -> Result<(), ChatError>;

    /// Delete a message.
    async fn delete_message(&self, target: MessageRef) -> Result<(), ChatError>;

    /// Attach component rows to an existing message, keeping its content.
    async fn add_components(
        &self,
        target: MessageRef,
        rows: Vec<Vec<crate::components::Component>>,
    ) -> Result<(), ChatError>;

    /// Strip every component from a message.
    async fn remove_components(&self, target: MessageRef) -> Result<(), ChatError>;

    /// Answer an interaction with a message only the acting user sees.
    async fn reply_ephemeral(
        &self,
        interaction: &InteractionEvent,
        content: String,
    ) -> Result<(), ChatError>;

    /// Check the channel still exists and is visible.
    async fn resolve_channel(&self, channel: ChannelId) -> Option<ChannelId>;
}

/// One recorded call against `RecordingChatClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Send {
        target: MessageRef,
        message: OutgoingMessage,
    },
    DirectMessage {
        user: UserId,
        target: MessageRef,
        message: OutgoingMessage,
    },
    Edit {
        target: MessageRef,
        message: OutgoingMessage,
    },
    Delete {
        target: MessageRef,
    },
    AddComponents {
        target: MessageRef,
    },
    RemoveComponents {
        target: MessageRef,
    },
    Ephemeral {
        user: UserId,
        content: String,
    },
}

/// In-memory chat client that records every call.
///
/// Message ids are allocated sequentially. Direct-message channels get the
/// id `1_000_000 + user id` so tests can predict them.
pub struct RecordingChatClient {
    next_message_id: AtomicU64,
    messages: RwLock<HashMap<MessageRef, OutgoingMessage>>,
    calls: RwLock<Vec<ChatCall>>,
    missing_channels: RwLock<HashSet<ChannelId>>,
    closed_dms: RwLock<HashSet<UserId>>,
}

/// Offset for synthetic direct-message channel ids.
pub const DM_CHANNEL_OFFSET: u64 = 1_000_000;

impl RecordingChatClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicU64::new(1),
            messages: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            missing_channels: RwLock::new(HashSet::new()),
            closed_dms: RwLock::new(HashSet::new()),
        }
    }

    /// Channel id used for direct messages with `user`.
    pub fn dm_channel(user: UserId) -> ChannelId {
        ChannelId(DM_CHANNEL_OFFSET + user.0)
    }

    /// Make `channel` unresolvable from now on.
    pub fn remove_channel(&self, channel: ChannelId) {
        self.missing_channels.write().insert(channel);
    }

    /// Make direct messages to `user` fail.
    pub fn close_direct_messages(&self, user: UserId) {
        self.closed_dms.write().insert(user);
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.read().clone()
    }

    /// Current state of a message.
    pub fn message(&self, target: MessageRef) -> Option<OutgoingMessage> {
        self.messages.read().get(&target).cloned()
    }

    /// Ephemeral replies sent to `user`.
    pub fn ephemerals_for(&self, user: UserId) -> Vec<String> {
        self.calls
            .read()
            .iter()
            .filter_map(|call| match call {
                ChatCall::Ephemeral { user: u, content } if *u == user => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages sent directly to `user`.
    pub fn direct_messages_for(&self, user: UserId) -> Vec<OutgoingMessage> {
        self.calls
            .read()
            .iter()
            .filter_map(|call| match call {
                ChatCall::DirectMessage { user: u, message, .. } if *u == user => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// The most recently sent (non-direct) message, if any.
    pub fn last_sent(&self) -> Option<(MessageRef, OutgoingMessage)> {
        self.calls.read().iter().rev().find_map(|call| match call {
            ChatCall::Send { target, message } => Some((*target, message.clone())),
            _ => None,
        })
    }

    fn allocate(&self, channel: ChannelId) -> MessageRef {
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        MessageRef::new(channel, MessageId(id))
    }

    fn check_channel(&self, channel: ChannelId) -> Result<(), ChatError> {
        if self.missing_channels.read().contains(&channel) {
            return Err(ChatError::UnknownChannel(channel.0));
        }
        Ok(())
    }

    fn check_message(&self, target: MessageRef) -> Result<(), ChatError> {
        self.check_channel(target.channel_id)?;
        if !self.messages.read().contains_key(&target) {
            return Err(ChatError::UnknownMessage(target.message_id.0));
        }
        Ok(())
    }
}

impl Default for RecordingChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, ChatError> {
        self.check_channel(channel)?;
        let target = self.allocate(channel);
        debug!(channel = %channel, message = %target.message_id, "Message sent");
        self.messages.write().insert(target, message.clone());
        self.calls.write().push(ChatCall::Send { target, message });
        Ok(target)
    }

    async fn send_direct_message(
        &self,
        user: UserId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, ChatError> {
        if self.closed_dms.read().contains(&user) {
            return Err(ChatError::CannotMessageUser(user.0));
        }
        let target = self.allocate(Self::dm_channel(user));
        self.messages.write().insert(target, message.clone());
        self.calls.write().push(ChatCall::DirectMessage {
            user,
            target,
            message,
        });
        Ok(target)
    }

    async fn edit_message(
        &self,
        target: MessageRef,
        message: OutgoingMessage,
    ) -> Result<(), ChatError> {
        self.check_message(target)?;
        self.messages.write().insert(target, message.clone());
        self.calls.write().push(ChatCall::Edit { target, message });
        Ok(())
    }

    async fn delete_message(&self, target: MessageRef) -> Result<(), ChatError> {
        self.check_message(target)?;
        self.messages.write().remove(&target);
        self.calls.write().push(ChatCall::Delete { target });
        Ok(())
    }

    async fn add_components(
        &self,
        target: MessageRef,
        rows: Vec<Vec<crate::components::Component>>,
    ) -> Result<(), ChatError> {
        self.check_message(target)?;
        if let Some(existing) = self.messages.write().get_mut(&target) {
            existing.rows = rows;
        }
        self.calls.write().push(ChatCall::AddComponents { target });
        Ok(())
    }

    async fn remove_components(&self, target: MessageRef) -> Result<(), ChatError> {
        self.check_message(target)?;
        if let Some(existing) = self.messages.write().get_mut(&target) {
            existing.rows.clear();
        }
        self.calls.write().push(ChatCall::RemoveComponents { target });
        Ok(())
    }

    async fn reply_ephemeral(
        &self,
        interaction: &InteractionEvent,
        content: String,
    ) -> Result<(), ChatError> {
        self.calls.write().push(ChatCall::Ephemeral {
            user: interaction.user,
            content,
        });
        Ok(())
    }

    async fn resolve_channel(&self, channel: ChannelId) -> Option<ChannelId> {
        if self.missing_channels.read().contains(&channel) {
            None
        } else {
            Some(channel)
        }
    }
}
