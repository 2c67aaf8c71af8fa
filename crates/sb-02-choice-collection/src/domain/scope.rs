//! Where a wait listens, and how waits are identified.

use shared_types::{ChannelId, InteractionEvent};
use std::fmt;

/// The message stream a wait reads from.
///
/// A participant can be in at most one active wait per scope, otherwise
/// their next message would be ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceScope {
    /// The participant's private channel with the bot.
    DirectMessage,
    /// One shared channel.
    Channel(ChannelId),
}

impl ChoiceScope {
    /// Scope an incoming event belongs to.
    pub fn of(event: &InteractionEvent) -> Self {
        if event.is_direct() {
            ChoiceScope::DirectMessage
        } else {
            ChoiceScope::Channel(event.channel_id)
        }
    }
}

impl fmt::Display for ChoiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceScope::DirectMessage => f.write_str("direct messages"),
            ChoiceScope::Channel(channel) => write!(f, "channel {channel}"),
        }
    }
}

/// Identifier of one registered wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitId(pub u64);

impl fmt::Display for WaitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait#{}", self.0)
    }
}
