//! # Selection Action Menu
//!
//! A message with one selection menu; each option maps to a handler.

use crate::domain::errors::{MenuError, SessionError};
use crate::domain::invariants::{invariant_action_count, invariant_unique_ids};
use crate::domain::settings::SelectionMenuSettings;
use crate::session::{Dispatch, SessionCore, SessionHandle};
use shared_bus::EventBroker;
use shared_types::{
    ChannelId, ChatClient, Component, ComponentId, MessageRef, OutgoingMessage, SelectMenu,
};
use std::sync::Arc;
use uuid::Uuid;

/// A session driven by a single-value selection.
pub struct SelectionActionMenu {
    core: Arc<SessionCore>,
    menu: ComponentId,
}

impl SelectionActionMenu {
    /// Validate the options and build the menu. Nothing is sent yet.
    pub fn new(
        chat: Arc<dyn ChatClient>,
        broker: Arc<dyn EventBroker>,
        settings: SelectionMenuSettings,
    ) -> Result<Self, MenuError> {
        let SelectionMenuSettings {
            session,
            content,
            menu_id,
            placeholder,
            options,
        } = settings;

        invariant_action_count(options.len())?;
        invariant_unique_ids(options.iter().map(|o| o.option.value.as_str()))?;

        let menu = ComponentId::new(menu_id.unwrap_or_else(|| format!("{}:select", Uuid::new_v4())));
        let select = SelectMenu {
            id: menu.clone(),
            placeholder,
            options: options.iter().map(|o| o.option.clone()).collect(),
            disabled: false,
        };
        let render = OutgoingMessage::with_components(content, vec![Component::Select(select)]);
        let handlers = options
            .into_iter()
            .map(|o| (o.option.value, o.handler))
            .collect();

        let core = SessionCore::new(
            "selection",
            chat,
            broker,
            session.users,
            session.timeout,
            Dispatch::Selection {
                menu: menu.clone(),
                handlers,
            },
            render,
            session.on_timeout,
        );
        Ok(Self { core, menu })
    }

    /// Id of the selection component.
    pub fn menu_id(&self) -> &ComponentId {
        &self.menu
    }

    /// The message this menu sends on display.
    pub fn rendered(&self) -> &OutgoingMessage {
        self.core.render()
    }

    /// Send the menu to `channel` and start waiting for a selection.
    pub async fn display(self, channel: ChannelId) -> Result<SessionHandle, SessionError> {
        self.core.display(channel).await?;
        Ok(SessionHandle::new(self.core))
    }

    /// Attach the menu to an existing message and start waiting.
    pub async fn display_existing(self, message: MessageRef) -> Result<SessionHandle, SessionError> {
        self.core.display_existing(message).await?;
        Ok(SessionHandle::new(self.core))
    }
}
