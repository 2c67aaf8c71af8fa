//! What a caller hands the waiter.

use crate::domain::choices::CollectedChoices;
use crate::domain::scope::ChoiceScope;
use futures::future::BoxFuture;
use futures::FutureExt;
use shared_types::{InteractionEvent, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default time participants have to answer.
pub const DEFAULT_CHOICE_TIMEOUT: Duration = Duration::from_secs(300);

/// Turns a message into a choice. `None` means "not a choice, keep waiting";
/// the decoder gives the user any feedback itself.
pub type Decoder<T> =
    Arc<dyn Fn(InteractionEvent) -> BoxFuture<'static, Option<T>> + Send + Sync>;

/// Receives the collected choices once the wait ends.
pub type ChoicesCallback<T> =
    Box<dyn FnOnce(CollectedChoices<T>) -> BoxFuture<'static, ()> + Send>;

/// A wait to register with [`MultiPartyChoiceWaiter`](crate::MultiPartyChoiceWaiter).
pub struct WaitRequest<T> {
    pub participants: Vec<UserId>,
    pub scope: ChoiceScope,
    pub decode: Decoder<T>,
    /// Fires once every participant chose.
    pub on_done: ChoicesCallback<T>,
    pub timeout: Duration,
    /// Fires with the partial choices if the deadline passes first.
    pub on_timeout: Option<ChoicesCallback<T>>,
    /// Stop tracking a participant after their first valid choice.
    pub ignore_double_choice: bool,
}

impl<T: Send + 'static> WaitRequest<T> {
    pub fn new<D, DFut, F, FFut>(
        participants: Vec<UserId>,
        scope: ChoiceScope,
        decode: D,
        on_done: F,
    ) -> Self
    where
        D: Fn(InteractionEvent) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = Option<T>> + Send + 'static,
        F: FnOnce(CollectedChoices<T>) -> FFut + Send + 'static,
        FFut: Future<Output = ()> + Send + 'static,
    {
        Self {
            participants,
            scope,
            decode: Arc::new(move |event| decode(event).boxed()),
            on_done: Box::new(move |choices| on_done(choices).boxed()),
            timeout: DEFAULT_CHOICE_TIMEOUT,
            on_timeout: None,
            ignore_double_choice: false,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn on_timeout<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce(CollectedChoices<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_timeout = Some(Box::new(move |choices| f(choices).boxed()));
        self
    }

    #[must_use]
    pub fn ignore_double_choice(mut self, ignore: bool) -> Self {
        self.ignore_double_choice = ignore;
        self
    }
}
