//! Event builders shared by the integration scenarios.

use shared_types::{
    ChannelId, ComponentId, GuildId, InteractionEvent, InteractionKind, MessageId, MessageRef,
    RecordingChatClient, UserId,
};
use std::sync::atomic::{AtomicU64, Ordering};

pub const GUILD: GuildId = GuildId(1);

static NEXT_INTERACTION: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_INTERACTION.fetch_add(1, Ordering::Relaxed)
}

fn event(
    user: UserId,
    target: MessageRef,
    guild: Option<GuildId>,
    kind: InteractionKind,
) -> InteractionEvent {
    InteractionEvent {
        interaction_id: next_id(),
        user,
        channel_id: target.channel_id,
        message_id: target.message_id,
        guild_id: guild,
        kind,
    }
}

fn text(content: &str) -> InteractionKind {
    InteractionKind::Message {
        content: content.to_string(),
    }
}

/// A direct message from `user` to the bot.
pub fn dm(user: UserId, content: &str) -> InteractionEvent {
    let target = MessageRef::new(RecordingChatClient::dm_channel(user), MessageId(next_id()));
    event(user, target, None, text(content))
}

/// A message posted in a guild channel.
pub fn say(user: UserId, channel: ChannelId, content: &str) -> InteractionEvent {
    let target = MessageRef::new(channel, MessageId(next_id()));
    event(user, target, Some(GUILD), text(content))
}

pub fn click(user: UserId, message: MessageRef, id: &ComponentId) -> InteractionEvent {
    event(
        user,
        message,
        Some(GUILD),
        InteractionKind::ButtonClick {
            component_id: id.clone(),
        },
    )
}

pub fn select(
    user: UserId,
    message: MessageRef,
    menu: &ComponentId,
    value: &str,
) -> InteractionEvent {
    event(
        user,
        message,
        Some(GUILD),
        InteractionKind::Selection {
            component_id: menu.clone(),
            values: vec![value.to_string()],
        },
    )
}

/// Yield until `done` holds. Work handed to spawned tasks needs a few polls
/// to land.
pub async fn settle<F>(mut done: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if done() {
            return true;
        }
        tokio::task::yield_now().await;
    }
    done()
}
