//! # Shared Types Crate
//!
//! Identifiers, message components, interaction events, the chat-platform
//! port and the static reference catalog used by every SetBot crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Narrow platform surface**: The core talks to the chat platform only
//!   through `ChatClient`; nothing here knows about a concrete platform SDK.

pub mod catalog;
pub mod chat;
pub mod components;
pub mod entities;
pub mod errors;
pub mod interaction;

pub use catalog::Catalog;
pub use chat::{ChatCall, ChatClient, RecordingChatClient};
pub use components::*;
pub use entities::*;
pub use errors::*;
pub use interaction::*;
