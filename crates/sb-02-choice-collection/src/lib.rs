//! # Multi-Party Choice Collection (Subsystem 2)
//!
//! Waits for one independent answer from each participant, typically
//! private replies such as rock-paper-scissors throws or blind character
//! picks, and proceeds once everyone answered or the deadline passed.
//!
//! ## Module Structure
//!
//! ```text
//! sb-02-choice-collection/
//! ├── domain/
//! │   ├── choices.rs  # CollectedChoices<T>
//! │   ├── errors.rs   # WaitRejected
//! │   ├── request.rs  # WaitRequest<T>, decoder and callback types
//! │   └── scope.rs    # ChoiceScope, WaitId
//! ├── element.rs      # One live wait, type-erased in the registry
//! └── service.rs      # MultiPartyChoiceWaiter
//! ```
//!
//! ## Guarantees
//!
//! - A participant is in at most one active wait per scope. A conflicting
//!   request is rejected and creates nothing.
//! - `on_done` runs exactly once, only when every participant chose.
//! - `on_timeout` runs at most once, never after `on_done`.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
mod element;
pub mod service;

pub use domain::choices::CollectedChoices;
pub use domain::errors::WaitRejected;
pub use domain::request::{ChoicesCallback, Decoder, WaitRequest, DEFAULT_CHOICE_TIMEOUT};
pub use domain::scope::{ChoiceScope, WaitId};
pub use service::MultiPartyChoiceWaiter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
