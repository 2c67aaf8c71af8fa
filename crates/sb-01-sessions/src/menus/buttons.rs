//! # Button Action Menu
//!
//! A message with buttons, each mapped to a handler.

use crate::domain::errors::{MenuError, SessionError};
use crate::domain::invariants::{invariant_action_count, invariant_actionable, invariant_unique_ids};
use crate::domain::settings::ButtonMenuSettings;
use crate::session::{Dispatch, SessionCore, SessionHandle};
use shared_bus::EventBroker;
use shared_types::{ChannelId, ChatClient, Component, MessageRef, OutgoingMessage};
use std::sync::Arc;

/// A session driven by button clicks.
pub struct ButtonActionMenu {
    core: Arc<SessionCore>,
}

impl ButtonActionMenu {
    /// Validate the buttons and build the menu. Nothing is sent yet.
    pub fn new(
        chat: Arc<dyn ChatClient>,
        broker: Arc<dyn EventBroker>,
        settings: ButtonMenuSettings,
    ) -> Result<Self, MenuError> {
        Self::with_kind("buttons", chat, broker, settings)
    }

    pub(crate) fn with_kind(
        kind: &'static str,
        chat: Arc<dyn ChatClient>,
        broker: Arc<dyn EventBroker>,
        settings: ButtonMenuSettings,
    ) -> Result<Self, MenuError> {
        let ButtonMenuSettings {
            session,
            content,
            buttons,
        } = settings;

        invariant_action_count(buttons.len())?;
        invariant_actionable(&buttons.iter().map(|b| &b.button).collect::<Vec<_>>())?;
        invariant_unique_ids(buttons.iter().map(|b| b.button.id.as_str()))?;

        let components = buttons
            .iter()
            .map(|b| Component::Button(b.button.clone()))
            .collect();
        let render = OutgoingMessage::with_components(content, components);
        let handlers = buttons
            .into_iter()
            .map(|b| (b.button.id, b.handler))
            .collect();

        let core = SessionCore::new(
            kind,
            chat,
            broker,
            session.users,
            session.timeout,
            Dispatch::Buttons(handlers),
            render,
            session.on_timeout,
        );
        Ok(Self { core })
    }

    /// The message this menu sends on display.
    pub fn rendered(&self) -> &OutgoingMessage {
        self.core.render()
    }

    /// Send the menu to `channel` and start waiting for clicks.
    pub async fn display(self, channel: ChannelId) -> Result<SessionHandle, SessionError> {
        self.core.display(channel).await?;
        Ok(SessionHandle::new(self.core))
    }

    /// Attach the buttons to an existing message and start waiting for clicks.
    pub async fn display_existing(self, message: MessageRef) -> Result<SessionHandle, SessionError> {
        self.core.display_existing(message).await?;
        Ok(SessionHandle::new(self.core))
    }
}
