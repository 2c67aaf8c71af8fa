//! Event builders for session tests.

use shared_types::{ComponentId, GuildId, InteractionEvent, InteractionKind, MessageRef, UserId};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INTERACTION: AtomicU64 = AtomicU64::new(1);

fn event(user: u64, message: MessageRef, kind: InteractionKind) -> InteractionEvent {
    InteractionEvent {
        interaction_id: NEXT_INTERACTION.fetch_add(1, Ordering::Relaxed),
        user: UserId(user),
        channel_id: message.channel_id,
        message_id: message.message_id,
        guild_id: Some(GuildId(1)),
        kind,
    }
}

pub(crate) fn click(user: u64, message: MessageRef, id: &str) -> InteractionEvent {
    event(
        user,
        message,
        InteractionKind::ButtonClick {
            component_id: ComponentId::new(id),
        },
    )
}

pub(crate) fn select(
    user: u64,
    message: MessageRef,
    menu: &ComponentId,
    values: &[&str],
) -> InteractionEvent {
    event(
        user,
        message,
        InteractionKind::Selection {
            component_id: menu.clone(),
            values: values.iter().map(|v| v.to_string()).collect(),
        },
    )
}
