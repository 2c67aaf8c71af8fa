//! # Wait Elements
//!
//! One element per registered wait. The waiter stores elements type-erased
//! so one waiter serves every choice type.
//!
//! Lock order is always registry, then element state. Retiring an element
//! (completion, timeout or cancel) happens with both held, so exactly one of
//! the three ever observes a live element.

use crate::domain::choices::CollectedChoices;
use crate::domain::request::{ChoicesCallback, Decoder};
use crate::domain::scope::{ChoiceScope, WaitId};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use setbot_telemetry::{metric_add, metric_inc, ACTIVE_PARTICIPANTS, CHOICE_WAITS};
use shared_types::{InteractionEvent, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{debug, info};

/// Type-erased view of an element.
pub(crate) trait PendingChoice: Send + Sync {
    /// Decode and record one message. Completion callbacks run inside.
    fn offer(self: Arc<Self>, event: InteractionEvent) -> BoxFuture<'static, ()>;

    /// Retire without callbacks. Caller holds the registry lock.
    fn retire_silently(&self, registry: &mut Registry) -> bool;
}

/// Active participants and live elements of one waiter.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) active: HashMap<(ChoiceScope, UserId), WaitId>,
    pub(crate) elements: HashMap<WaitId, Arc<dyn PendingChoice>>,
}

impl Registry {
    pub(crate) fn is_active(&self, scope: ChoiceScope, user: UserId) -> bool {
        self.active.contains_key(&(scope, user))
    }

    pub(crate) fn element_for(
        &self,
        scope: ChoiceScope,
        user: UserId,
    ) -> Option<Arc<dyn PendingChoice>> {
        let id = self.active.get(&(scope, user))?;
        self.elements.get(id).cloned()
    }

    /// Stop tracking one participant of element `id`.
    fn release(&mut self, scope: ChoiceScope, user: UserId, id: WaitId) {
        if self.active.get(&(scope, user)) == Some(&id) {
            self.active.remove(&(scope, user));
            metric_add!(ACTIVE_PARTICIPANTS, -1.0);
        }
    }

    fn remove(&mut self, id: WaitId, scope: ChoiceScope, participants: &[UserId]) {
        for &user in participants {
            self.release(scope, user, id);
        }
        self.elements.remove(&id);
    }
}

pub(crate) type SharedRegistry = Arc<Mutex<Registry>>;

struct ElementState<T> {
    choices: HashMap<UserId, T>,
    on_done: Option<ChoicesCallback<T>>,
    on_timeout: Option<ChoicesCallback<T>>,
    timer: Option<AbortHandle>,
    retired: bool,
}

pub(crate) struct Element<T> {
    id: WaitId,
    scope: ChoiceScope,
    participants: Vec<UserId>,
    ignore_double_choice: bool,
    decode: Decoder<T>,
    registry: SharedRegistry,
    state: Mutex<ElementState<T>>,
}

impl<T: Send + 'static> Element<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: WaitId,
        scope: ChoiceScope,
        participants: Vec<UserId>,
        ignore_double_choice: bool,
        decode: Decoder<T>,
        on_done: ChoicesCallback<T>,
        on_timeout: Option<ChoicesCallback<T>>,
        registry: SharedRegistry,
    ) -> Self {
        Self {
            id,
            scope,
            participants,
            ignore_double_choice,
            decode,
            registry,
            state: Mutex::new(ElementState {
                choices: HashMap::new(),
                on_done: Some(on_done),
                on_timeout,
                timer: None,
                retired: false,
            }),
        }
    }

    pub(crate) fn set_timer(&self, timer: AbortHandle) {
        self.state.lock().timer = Some(timer);
    }

    fn collected(&self, state: &mut ElementState<T>) -> CollectedChoices<T> {
        CollectedChoices::new(self.participants.clone(), std::mem::take(&mut state.choices))
    }

    fn retire(&self, registry: &mut Registry, state: &mut ElementState<T>) {
        state.retired = true;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        registry.remove(self.id, self.scope, &self.participants);
    }

    async fn record(self: Arc<Self>, event: InteractionEvent) {
        let user = event.user;
        let Some(value) = (self.decode)(event).await else {
            debug!(wait = %self.id, user = %user, "Message is not a choice");
            return;
        };

        let completed = {
            let mut registry = self.registry.lock();
            let mut state = self.state.lock();
            if state.retired {
                return;
            }
            if self.ignore_double_choice && state.choices.contains_key(&user) {
                return;
            }

            state.choices.insert(user, value);
            if self.ignore_double_choice {
                registry.release(self.scope, user, self.id);
            }
            debug!(
                wait = %self.id,
                user = %user,
                chosen = state.choices.len(),
                of = self.participants.len(),
                "Choice recorded"
            );

            if state.choices.len() == self.participants.len() {
                self.retire(&mut registry, &mut state);
                let collected = self.collected(&mut state);
                state.on_done.take().map(|on_done| (on_done, collected))
            } else {
                None
            }
        };

        if let Some((on_done, collected)) = completed {
            metric_inc!(CHOICE_WAITS, &["completed"]);
            info!(wait = %self.id, "All choices collected");
            on_done(collected).await;
        }
    }

    /// Deadline reached.
    pub(crate) async fn expire(self: Arc<Self>) {
        let expired = {
            let mut registry = self.registry.lock();
            let mut state = self.state.lock();
            if state.retired {
                return;
            }
            // This runs on the timer task; aborting it would cut `on_timeout` short.
            state.timer = None;
            self.retire(&mut registry, &mut state);
            let collected = self.collected(&mut state);
            (state.on_timeout.take(), collected)
        };

        metric_inc!(CHOICE_WAITS, &["timed_out"]);
        let (on_timeout, collected) = expired;
        info!(
            wait = %self.id,
            missing = collected.missing().len(),
            "Choice wait timed out"
        );
        if let Some(on_timeout) = on_timeout {
            on_timeout(collected).await;
        }
    }
}

impl<T: Send + 'static> PendingChoice for Element<T> {
    fn offer(self: Arc<Self>, event: InteractionEvent) -> BoxFuture<'static, ()> {
        self.record(event).boxed()
    }

    fn retire_silently(&self, registry: &mut Registry) -> bool {
        let mut state = self.state.lock();
        if state.retired {
            return false;
        }
        self.retire(registry, &mut state);
        true
    }
}
