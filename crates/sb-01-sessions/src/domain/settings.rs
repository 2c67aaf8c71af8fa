//! Menu settings with documented defaults.

use crate::domain::action::{
    timeout_handler, ButtonAction, SelectionAction, SessionTimeout, TimeoutHandler,
};
use crate::domain::errors::SessionError;
use shared_types::UserId;
use std::future::Future;
use std::time::Duration;

/// Default time a menu waits for its next interaction.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings common to every session.
pub struct SessionSettings {
    /// Users allowed to interact. Empty means anyone.
    pub users: Vec<UserId>,
    /// How long each wait lasts. Re-arming starts a new wait.
    pub timeout: Duration,
    /// Runs on expiry. When `None` the components are stripped from the message.
    pub on_timeout: Option<TimeoutHandler>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            timeout: DEFAULT_SESSION_TIMEOUT,
            on_timeout: None,
        }
    }
}

impl SessionSettings {
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
    pub fn on_timeout<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce(SessionTimeout) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), SessionError>> + Send + 'static,
    {
        self.on_timeout = Some(timeout_handler(f));
        self
    }
}

/// Settings for a [`ButtonActionMenu`](crate::ButtonActionMenu).
pub struct ButtonMenuSettings {
    pub session: SessionSettings,
    pub content: String,
    pub buttons: Vec<ButtonAction>,
}

/// Settings for a [`SelectionActionMenu`](crate::SelectionActionMenu).
pub struct SelectionMenuSettings {
    pub session: SessionSettings,
    pub content: String,
    /// Id of the selection menu component. A random one is generated when `None`.
    pub menu_id: Option<String>,
    pub placeholder: Option<String>,
    pub options: Vec<SelectionAction>,
}
