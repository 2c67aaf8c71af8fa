//! # Session Core
//!
//! One pending decision bound to one rendered message. The core owns the
//! permitted users, the timeout and the single re-armable broker
//! registration; menus only supply the handler table and the initial render.
//!
//! ## Lifecycle
//!
//! ```text
//! display ─► arm ─┬─ event ─► handle ─┬─ Continue ─► arm
//!                 │                   ├─ ignored ──► rearm
//!                 │                   └─ Cancel ───► finished
//!                 └─ timeout ─► expire ──────────────► finished
//! ```
//!
//! `arm` starts a fresh deadline. `rearm` waits out whatever is left of the
//! current one, so rejected clicks never extend a session.
//!
//! `handle` and `expire` serialize on the handler lock. Both check the
//! terminal flag first, so a late event or a timer that lost the race is a
//! no-op.

use crate::domain::action::{ActionHandler, SessionAction, SessionTimeout, TimeoutHandler};
use crate::domain::errors::SessionError;
use futures::FutureExt;
use parking_lot::Mutex;
use setbot_telemetry::{
    metric_inc, CALLBACK_FAILURES, INTERACTIONS_REJECTED, SESSIONS_OPENED, SESSION_TIMEOUTS,
};
use shared_bus::{EventBroker, RegistrationId};
use shared_types::{
    ChannelId, ChatClient, ComponentId, InteractionEvent, InteractionKind, MessageRef,
    OutgoingMessage, UserId,
};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub(crate) const NOT_ALLOWED_NOTICE: &str = "You are not allowed to use this menu.";
pub(crate) const ONE_OPTION_NOTICE: &str = "Please choose exactly one option.";
pub(crate) const UNKNOWN_OPTION_NOTICE: &str = "That option is not available.";

/// How incoming component events map to handlers.
pub(crate) enum Dispatch {
    /// Keyed by button id.
    Buttons(HashMap<ComponentId, ActionHandler>),
    /// Keyed by the single selected value of one selection menu.
    Selection {
        menu: ComponentId,
        handlers: HashMap<String, ActionHandler>,
    },
}

impl Dispatch {
    /// Handler for an event, or the notice to show the user.
    fn resolve(&self, event: &InteractionEvent) -> Result<ActionHandler, &'static str> {
        match (self, &event.kind) {
            (Dispatch::Buttons(handlers), InteractionKind::ButtonClick { component_id }) => {
                handlers
                    .get(component_id)
                    .cloned()
                    .ok_or(UNKNOWN_OPTION_NOTICE)
            }
            (Dispatch::Selection { handlers, .. }, InteractionKind::Selection { values, .. }) => {
                match values.as_slice() {
                    [value] => handlers.get(value).cloned().ok_or(UNKNOWN_OPTION_NOTICE),
                    _ => Err(ONE_OPTION_NOTICE),
                }
            }
            _ => Err(UNKNOWN_OPTION_NOTICE),
        }
    }

    fn ids(&self) -> Vec<ComponentId> {
        match self {
            Dispatch::Buttons(handlers) => handlers.keys().cloned().collect(),
            Dispatch::Selection { menu, .. } => vec![menu.clone()],
        }
    }
}

#[derive(Default)]
struct SessionState {
    message: Option<MessageRef>,
    terminal: bool,
    registration: Option<RegistrationId>,
    /// `None` when the timeout is too large to represent.
    deadline: Option<Instant>,
}

pub(crate) struct SessionCore {
    kind: &'static str,
    chat: Arc<dyn ChatClient>,
    broker: Arc<dyn EventBroker>,
    users: Vec<UserId>,
    timeout: Duration,
    dispatch: Dispatch,
    render: OutgoingMessage,
    on_timeout: Mutex<Option<TimeoutHandler>>,
    state: Mutex<SessionState>,
    handler_lock: tokio::sync::Mutex<()>,
}

impl SessionCore {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        kind: &'static str,
        chat: Arc<dyn ChatClient>,
        broker: Arc<dyn EventBroker>,
        users: Vec<UserId>,
        timeout: Duration,
        dispatch: Dispatch,
        render: OutgoingMessage,
        on_timeout: Option<TimeoutHandler>,
    ) -> Arc<Self> {
        let mut users = users;
        users.sort();
        users.dedup();
        Arc::new(Self {
            kind,
            chat,
            broker,
            users,
            timeout,
            dispatch,
            render,
            on_timeout: Mutex::new(on_timeout),
            state: Mutex::new(SessionState::default()),
            handler_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub(crate) fn render(&self) -> &OutgoingMessage {
        &self.render
    }

    /// Send the initial render to `channel` and start waiting.
    pub(crate) async fn display(
        self: &Arc<Self>,
        channel: ChannelId,
    ) -> Result<MessageRef, SessionError> {
        let message = self.chat.send_message(channel, self.render.clone()).await?;
        self.bind(message);
        Ok(message)
    }

    /// Attach the components to an existing message and start waiting.
    pub(crate) async fn display_existing(
        self: &Arc<Self>,
        message: MessageRef,
    ) -> Result<(), SessionError> {
        self.chat
            .add_components(message, self.render.rows.clone())
            .await?;
        self.bind(message);
        Ok(())
    }

    fn bind(self: &Arc<Self>, message: MessageRef) {
        self.state.lock().message = Some(message);
        metric_inc!(SESSIONS_OPENED, &[self.kind]);
        info!(
            kind = self.kind,
            channel = %message.channel_id,
            message = %message.message_id,
            users = self.users.len(),
            timeout_secs = self.timeout.as_secs(),
            "Session displayed"
        );
        self.arm();
    }

    fn permits(&self, user: UserId) -> bool {
        self.users.is_empty() || self.users.binary_search(&user).is_ok()
    }

    /// Start a fresh deadline and wait for the next event.
    fn arm(self: &Arc<Self>) {
        self.state.lock().deadline = Instant::now().checked_add(self.timeout);
        self.register(self.timeout);
    }

    /// Wait again without moving the deadline.
    fn rearm(self: &Arc<Self>) {
        let deadline = self.state.lock().deadline;
        let remaining = deadline.map_or(self.timeout, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });
        self.register(remaining);
    }

    /// Register the next one-shot wait on the bound message.
    fn register(self: &Arc<Self>, timeout: Duration) {
        let mut state = self.state.lock();
        let Some(message) = state.message else {
            return;
        };
        if state.terminal {
            return;
        }

        let ids = self.dispatch.ids();
        let predicate = Box::new(move |event: &InteractionEvent| {
            event.message_id == message.message_id
                && event
                    .kind
                    .component_id()
                    .is_some_and(|id| ids.contains(id))
        });
        let on_match = {
            let core = Arc::clone(self);
            Box::new(move |event: InteractionEvent| core.handle(event).boxed())
        };
        let on_timeout = {
            let core = Arc::clone(self);
            Box::new(move || core.expire().boxed())
        };

        // Held across registration so a zero timeout cannot fire before the
        // id is stored.
        let id = self
            .broker
            .await_event(predicate, timeout, on_match, on_timeout);
        state.registration = Some(id);
        debug!(kind = self.kind, registration = %id, "Session armed");
    }

    async fn handle(self: Arc<Self>, event: InteractionEvent) {
        let _serial = self.handler_lock.lock().await;
        {
            let mut state = self.state.lock();
            if state.terminal {
                debug!(kind = self.kind, user = %event.user, "Late event ignored");
                return;
            }
            state.registration = None;
        }

        if !self.permits(event.user) {
            metric_inc!(INTERACTIONS_REJECTED);
            debug!(kind = self.kind, user = %event.user, "Interaction from non-permitted user");
            self.notify(&event, NOT_ALLOWED_NOTICE).await;
            self.rearm();
            return;
        }

        let handler = match self.dispatch.resolve(&event) {
            Ok(handler) => handler,
            Err(notice) => {
                self.notify(&event, notice).await;
                self.rearm();
                return;
            }
        };

        match handler(event).await {
            SessionAction::Continue => self.arm(),
            SessionAction::Cancel => {
                let mut state = self.state.lock();
                state.terminal = true;
                state.registration = None;
                debug!(kind = self.kind, "Session finished by handler");
            }
        }
    }

    async fn expire(self: Arc<Self>) {
        let _serial = self.handler_lock.lock().await;
        let message = {
            let mut state = self.state.lock();
            if state.terminal {
                return;
            }
            state.terminal = true;
            state.registration = None;
            state.message
        };
        let Some(message) = message else {
            return;
        };

        metric_inc!(SESSION_TIMEOUTS);
        let channel = self.chat.resolve_channel(message.channel_id).await;
        info!(
            kind = self.kind,
            message = %message.message_id,
            channel_resolved = channel.is_some(),
            "Session timed out"
        );

        let handler = self.on_timeout.lock().take();
        match handler {
            Some(handler) => {
                let timeout = SessionTimeout { message, channel };
                let outcome = AssertUnwindSafe(async move { handler(timeout).await })
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        metric_inc!(CALLBACK_FAILURES);
                        error!(kind = self.kind, error = %e, "Timeout callback failed");
                    }
                    Err(_) => {
                        metric_inc!(CALLBACK_FAILURES);
                        error!(kind = self.kind, "Timeout callback panicked");
                    }
                }
            }
            None if channel.is_some() => {
                if let Err(e) = self.chat.remove_components(message).await {
                    warn!(kind = self.kind, error = %e, "Failed to strip components");
                }
            }
            None => {}
        }
    }

    async fn notify(&self, event: &InteractionEvent, notice: &str) {
        if let Err(e) = self.chat.reply_ephemeral(event, notice.to_string()).await {
            warn!(kind = self.kind, error = %e, "Failed to send notice");
        }
    }

    fn cancel(&self) -> bool {
        let registration = {
            let mut state = self.state.lock();
            if state.terminal {
                return false;
            }
            state.terminal = true;
            state.registration.take()
        };
        if let Some(id) = registration {
            self.broker.cancel(id);
        }
        debug!(kind = self.kind, "Session cancelled");
        true
    }
}

/// Handle to a displayed session.
#[derive(Clone)]
pub struct SessionHandle {
    core: Arc<SessionCore>,
}

impl SessionHandle {
    pub(crate) fn new(core: Arc<SessionCore>) -> Self {
        Self { core }
    }

    /// End the session and withdraw its pending wait.
    ///
    /// Returns `false` if it had already finished.
    pub fn cancel(&self) -> bool {
        self.core.cancel()
    }

    /// The message this session is bound to.
    pub fn message(&self) -> Option<MessageRef> {
        self.core.state.lock().message
    }

    /// Whether the session stopped waiting.
    pub fn is_finished(&self) -> bool {
        self.core.state.lock().terminal
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("SessionHandle")
            .field("kind", &self.core.kind)
            .field("message", &state.message)
            .field("terminal", &state.terminal)
            .finish()
    }
}
