//! Handler and callback types shared by every menu.

use crate::domain::errors::SessionError;
use futures::future::BoxFuture;
use futures::FutureExt;
use shared_types::{Button, ChannelId, InteractionEvent, MessageRef, SelectOption};
use std::future::Future;
use std::sync::Arc;

/// What a handler wants the session to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Keep waiting on the same message.
    Continue,
    /// End the session. Later events are ignored.
    Cancel,
}

/// Handles one qualifying interaction.
pub type ActionHandler =
    Arc<dyn Fn(InteractionEvent) -> BoxFuture<'static, SessionAction> + Send + Sync>;

/// Wrap an async closure as an [`ActionHandler`].
pub fn action_handler<F, Fut>(f: F) -> ActionHandler
where
    F: Fn(InteractionEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SessionAction> + Send + 'static,
{
    Arc::new(move |event| f(event).boxed())
}

/// Passed to timeout callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeout {
    /// The message the session was bound to.
    pub message: MessageRef,
    /// `None` when the channel can no longer be resolved.
    pub channel: Option<ChannelId>,
}

/// Runs once when a session expires without a terminal interaction.
pub type TimeoutHandler =
    Box<dyn FnOnce(SessionTimeout) -> BoxFuture<'static, Result<(), SessionError>> + Send>;

/// Wrap an async closure as a [`TimeoutHandler`].
pub fn timeout_handler<F, Fut>(f: F) -> TimeoutHandler
where
    F: FnOnce(SessionTimeout) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), SessionError>> + Send + 'static,
{
    Box::new(move |timeout| f(timeout).boxed())
}

/// A button and what clicking it does.
pub struct ButtonAction {
    pub button: Button,
    pub handler: ActionHandler,
}

impl ButtonAction {
    pub fn new<F, Fut>(button: Button, f: F) -> Self
    where
        F: Fn(InteractionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SessionAction> + Send + 'static,
    {
        Self {
            button,
            handler: action_handler(f),
        }
    }
}

/// A selection option and what choosing it does.
pub struct SelectionAction {
    pub option: SelectOption,
    pub handler: ActionHandler,
}

impl SelectionAction {
    pub fn new<F, Fut>(option: SelectOption, f: F) -> Self
    where
        F: Fn(InteractionEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SessionAction> + Send + 'static,
    {
        Self {
            option,
            handler: action_handler(f),
        }
    }
}
