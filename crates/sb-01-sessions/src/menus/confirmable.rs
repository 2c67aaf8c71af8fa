//! # Confirmable Choice Menu
//!
//! Accumulates between `min_choices` and `max_choices` picks from a fixed set
//! of buttons, with reset and confirm controls:
//!
//! ```text
//! [ Stage A ] [ Stage B ] [ Stage C ] [ Reset ] [ Confirm ]
//! ```
//!
//! Confirm is enabled only while the count is within bounds. Component ids
//! carry a per-menu random prefix so two menus on one channel never collide.

use crate::domain::action::{timeout_handler, ButtonAction, SessionAction, SessionTimeout};
use crate::domain::errors::{MenuError, SessionError};
use crate::domain::settings::{ButtonMenuSettings, SessionSettings, DEFAULT_SESSION_TIMEOUT};
use crate::menus::buttons::ButtonActionMenu;
use crate::session::SessionHandle;
use futures::future::BoxFuture;
use futures::FutureExt;
use shared_bus::EventBroker;
use shared_types::{
    Button, ButtonStyle, ChannelId, ChatClient, Component, ComponentId, InteractionEvent,
    MessageRef, OutgoingMessage, UserId,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// One selectable value and its button label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<T> {
    pub value: T,
    pub label: String,
}

impl<T> Choice<T> {
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Receives the confirmed values and the confirming interaction.
pub type ConfirmCallback<T> =
    Box<dyn FnOnce(Vec<T>, InteractionEvent) -> BoxFuture<'static, ()> + Send>;

/// Receives the timeout and whatever was chosen before it.
pub type PartialTimeoutCallback<T> = Box<
    dyn FnOnce(SessionTimeout, Vec<T>) -> BoxFuture<'static, Result<(), SessionError>> + Send,
>;

/// Settings for a [`ConfirmableChoiceMenu`].
pub struct ConfirmableSettings<T> {
    /// Users allowed to click. Empty means anyone.
    pub users: Vec<UserId>,
    pub timeout: Duration,
    pub content: String,
    pub choices: Vec<Choice<T>>,
    pub min_choices: usize,
    pub max_choices: usize,
    /// Whether one choice may be picked more than once.
    pub allow_repeats: bool,
    pub on_confirm: ConfirmCallback<T>,
    /// When `None` the components are stripped on timeout.
    pub on_timeout: Option<PartialTimeoutCallback<T>>,
}

impl<T> ConfirmableSettings<T> {
    /// Exactly one choice, anyone may click, default timeout.
    pub fn new<F, Fut>(content: impl Into<String>, choices: Vec<Choice<T>>, on_confirm: F) -> Self
    where
        F: FnOnce(Vec<T>, InteractionEvent) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            users: Vec::new(),
            timeout: DEFAULT_SESSION_TIMEOUT,
            content: content.into(),
            choices,
            min_choices: 1,
            max_choices: 1,
            allow_repeats: false,
            on_confirm: Box::new(move |values, event| on_confirm(values, event).boxed()),
            on_timeout: None,
        }
    }

    #[must_use]
    pub fn with_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.users = users.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min_choices: usize, max_choices: usize) -> Self {
        self.min_choices = min_choices;
        self.max_choices = max_choices;
        self
    }

    #[must_use]
    pub fn allow_repeats(mut self, allow: bool) -> Self {
        self.allow_repeats = allow;
        self
    }

    #[must_use]
    pub fn on_timeout<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce(SessionTimeout, Vec<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), SessionError>> + Send + 'static,
    {
        self.on_timeout = Some(Box::new(move |timeout, partial| f(timeout, partial).boxed()));
        self
    }
}

/// Closed set of controls, parsed from component ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Choice(usize),
    Reset,
    Confirm,
}

impl Control {
    fn id(self, prefix: &str) -> ComponentId {
        match self {
            Control::Choice(index) => ComponentId::new(format!("{prefix}:choice:{index}")),
            Control::Reset => ComponentId::new(format!("{prefix}:reset")),
            Control::Confirm => ComponentId::new(format!("{prefix}:confirm")),
        }
    }

    fn parse(prefix: &str, id: &str) -> Option<Self> {
        let rest = id.strip_prefix(prefix)?.strip_prefix(':')?;
        match rest {
            "reset" => Some(Control::Reset),
            "confirm" => Some(Control::Confirm),
            _ => rest
                .strip_prefix("choice:")
                .and_then(|index| index.parse().ok())
                .map(Control::Choice),
        }
    }
}

struct Progress<T> {
    chosen: Vec<usize>,
    on_confirm: Option<ConfirmCallback<T>>,
}

struct ChoiceBoard<T> {
    prefix: String,
    content: String,
    choices: Vec<Choice<T>>,
    min_choices: usize,
    max_choices: usize,
    allow_repeats: bool,
    chat: Arc<dyn ChatClient>,
    progress: tokio::sync::Mutex<Progress<T>>,
}

impl<T: Clone + Send + Sync + 'static> ChoiceBoard<T> {
    fn in_bounds(&self, count: usize) -> bool {
        (self.min_choices..=self.max_choices).contains(&count)
    }

    fn labels(&self, chosen: &[usize]) -> String {
        chosen
            .iter()
            .map(|&i| self.choices[i].label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn buttons(&self, chosen: &[usize]) -> Vec<Button> {
        let full = chosen.len() >= self.max_choices;
        let mut buttons: Vec<Button> = self
            .choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let picked = chosen.contains(&i);
                let style = if picked {
                    ButtonStyle::Success
                } else {
                    ButtonStyle::Secondary
                };
                Button::new(Control::Choice(i).id(&self.prefix).0, &choice.label, style)
                    .with_disabled(full || (picked && !self.allow_repeats))
            })
            .collect();
        buttons.push(
            Button::new(Control::Reset.id(&self.prefix).0, "Reset", ButtonStyle::Danger)
                .with_disabled(chosen.is_empty()),
        );
        buttons.push(
            Button::new(
                Control::Confirm.id(&self.prefix).0,
                "Confirm",
                ButtonStyle::Primary,
            )
            .with_disabled(!self.in_bounds(chosen.len())),
        );
        buttons
    }

    fn render(&self, chosen: &[usize]) -> OutgoingMessage {
        let content = if chosen.is_empty() {
            self.content.clone()
        } else {
            format!("{}\nSelected: {}", self.content, self.labels(chosen))
        };
        let components = self
            .buttons(chosen)
            .into_iter()
            .map(Component::Button)
            .collect();
        OutgoingMessage::with_components(content, components)
    }

    async fn refresh(&self, event: &InteractionEvent, chosen: &[usize]) {
        if let Err(e) = self
            .chat
            .edit_message(event.message_ref(), self.render(chosen))
            .await
        {
            warn!(error = %e, "Failed to re-render choice menu");
        }
    }

    async fn notify(&self, event: &InteractionEvent, notice: String) {
        if let Err(e) = self.chat.reply_ephemeral(event, notice).await {
            warn!(error = %e, "Failed to send notice");
        }
    }

    async fn partial(&self) -> Vec<T> {
        let progress = self.progress.lock().await;
        progress
            .chosen
            .iter()
            .map(|&i| self.choices[i].value.clone())
            .collect()
    }

    async fn on_click(self: Arc<Self>, event: InteractionEvent) -> SessionAction {
        let control = event
            .kind
            .component_id()
            .and_then(|id| Control::parse(&self.prefix, id.as_str()));
        let mut progress = self.progress.lock().await;

        match control {
            Some(Control::Choice(index)) if index < self.choices.len() => {
                if progress.chosen.len() >= self.max_choices {
                    let notice = format!(
                        "You can only choose {} option(s). Reset to start over.",
                        self.max_choices
                    );
                    self.notify(&event, notice).await;
                } else if !self.allow_repeats && progress.chosen.contains(&index) {
                    self.notify(&event, "You already chose that.".to_string())
                        .await;
                } else {
                    progress.chosen.push(index);
                    debug!(index, count = progress.chosen.len(), "Choice added");
                    self.refresh(&event, &progress.chosen).await;
                }
                SessionAction::Continue
            }
            Some(Control::Reset) => {
                progress.chosen.clear();
                self.refresh(&event, &progress.chosen).await;
                SessionAction::Continue
            }
            Some(Control::Confirm) => {
                let count = progress.chosen.len();
                if !self.in_bounds(count) {
                    let notice = format!(
                        "Choose between {} and {} option(s) before confirming.",
                        self.min_choices, self.max_choices
                    );
                    self.notify(&event, notice).await;
                    return SessionAction::Continue;
                }

                let values = progress
                    .chosen
                    .iter()
                    .map(|&i| self.choices[i].value.clone())
                    .collect();
                let summary = format!(
                    "{}\nConfirmed: {}",
                    self.content,
                    self.labels(&progress.chosen)
                );
                if let Err(e) = self
                    .chat
                    .edit_message(event.message_ref(), OutgoingMessage::text(summary))
                    .await
                {
                    warn!(error = %e, "Failed to finalize choice menu");
                }
                if let Some(on_confirm) = progress.on_confirm.take() {
                    on_confirm(values, event).await;
                }
                SessionAction::Cancel
            }
            _ => {
                self.notify(&event, "Unknown choice.".to_string()).await;
                SessionAction::Continue
            }
        }
    }
}

/// A button menu that collects a bounded list of choices before confirming.
pub struct ConfirmableChoiceMenu<T> {
    menu: ButtonActionMenu,
    board: Arc<ChoiceBoard<T>>,
}

impl<T: Clone + Send + Sync + 'static> ConfirmableChoiceMenu<T> {
    /// Validate the bounds and build the menu. Nothing is sent yet.
    pub fn new(
        chat: Arc<dyn ChatClient>,
        broker: Arc<dyn EventBroker>,
        settings: ConfirmableSettings<T>,
    ) -> Result<Self, MenuError> {
        let ConfirmableSettings {
            users,
            timeout,
            content,
            choices,
            min_choices,
            max_choices,
            allow_repeats,
            on_confirm,
            on_timeout,
        } = settings;

        if choices.is_empty() {
            return Err(MenuError::NoActions);
        }
        let unreachable_min = !allow_repeats && min_choices > choices.len();
        if max_choices == 0 || min_choices > max_choices || unreachable_min {
            return Err(MenuError::InvalidChoiceBounds {
                min: min_choices,
                max: max_choices,
                available: choices.len(),
            });
        }

        let board = Arc::new(ChoiceBoard {
            prefix: Uuid::new_v4().to_string(),
            content,
            choices,
            min_choices,
            max_choices,
            allow_repeats,
            chat: Arc::clone(&chat),
            progress: tokio::sync::Mutex::new(Progress {
                chosen: Vec::new(),
                on_confirm: Some(on_confirm),
            }),
        });

        let buttons = board
            .buttons(&[])
            .into_iter()
            .map(|button| {
                let board = Arc::clone(&board);
                ButtonAction::new(button, move |event| Arc::clone(&board).on_click(event))
            })
            .collect();

        let on_timeout = on_timeout.map(|callback| {
            let board = Arc::clone(&board);
            timeout_handler(move |timeout| async move {
                let partial = board.partial().await;
                callback(timeout, partial).await
            })
        });

        let session = SessionSettings {
            users,
            timeout,
            on_timeout,
        };
        let menu = ButtonActionMenu::with_kind(
            "confirmable",
            chat,
            broker,
            ButtonMenuSettings {
                session,
                content: board.content.clone(),
                buttons,
            },
        )?;
        Ok(Self { menu, board })
    }

    /// Component id of the choice at `index`.
    pub fn choice_id(&self, index: usize) -> ComponentId {
        Control::Choice(index).id(&self.board.prefix)
    }

    /// Component id of the reset button.
    pub fn reset_id(&self) -> ComponentId {
        Control::Reset.id(&self.board.prefix)
    }

    /// Component id of the confirm button.
    pub fn confirm_id(&self) -> ComponentId {
        Control::Confirm.id(&self.board.prefix)
    }

    /// The message this menu sends on display.
    pub fn rendered(&self) -> &OutgoingMessage {
        self.menu.rendered()
    }

    /// Send the menu to `channel` and start collecting.
    pub async fn display(self, channel: ChannelId) -> Result<SessionHandle, SessionError> {
        self.menu.display(channel).await
    }

    /// Attach the menu to an existing message and start collecting.
    pub async fn display_existing(self, message: MessageRef) -> Result<SessionHandle, SessionError> {
        self.menu.display_existing(message).await
    }
}
