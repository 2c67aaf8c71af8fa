//! # Interactive Sessions (Subsystem 1)
//!
//! A session is one pending decision bound to one rendered message: it waits
//! for a qualifying interaction from a permitted user, dispatches it to the
//! handler registered for that component, and either re-arms or ends.
//!
//! ## Menus
//!
//! - [`ButtonActionMenu`]: one handler per button
//! - [`SelectionActionMenu`]: one handler per selection value
//! - [`ConfirmableChoiceMenu`]: collects a bounded list of choices, with
//!   reset and confirm
//!
//! ## Module Structure
//!
//! ```text
//! sb-01-sessions/
//! ├── domain/
//! │   ├── action.rs      # SessionAction, handler and callback types
//! │   ├── errors.rs      # MenuError, SessionError
//! │   ├── invariants.rs  # Construction checks
//! │   └── settings.rs    # Settings with defaults
//! ├── menus/
//! │   ├── buttons.rs     # ButtonActionMenu
//! │   ├── confirmable.rs # ConfirmableChoiceMenu<T>
//! │   └── selection.rs   # SelectionActionMenu
//! └── session.rs         # Arm / handle / expire loop, SessionHandle
//! ```
//!
//! ## Guarantees
//!
//! - Events from users outside the permitted set never reach a handler.
//! - After `Cancel`, a timeout, or [`SessionHandle::cancel`], no handler runs
//!   again, even for events already in flight.
//! - The timeout path runs at most once; its errors and panics are logged.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod domain;
pub mod menus;
mod session;

#[cfg(test)]
mod test_support;

pub use domain::action::{
    action_handler, timeout_handler, ActionHandler, ButtonAction, SelectionAction, SessionAction,
    SessionTimeout, TimeoutHandler,
};
pub use domain::errors::{MenuError, SessionError};
pub use domain::invariants::MAX_COMPONENTS;
pub use domain::settings::{
    ButtonMenuSettings, SelectionMenuSettings, SessionSettings, DEFAULT_SESSION_TIMEOUT,
};
pub use menus::buttons::ButtonActionMenu;
pub use menus::confirmable::{
    Choice, ConfirmCallback, ConfirmableChoiceMenu, ConfirmableSettings, PartialTimeoutCallback,
};
pub use menus::selection::SelectionActionMenu;
pub use session::SessionHandle;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
