//! # SetBot Runtime Library
//!
//! This library exposes the runtime's modules for testing. The main entry
//! point is the `setbot` binary in `main.rs`.
//!
//! ## Module Structure
//!
//! ```text
//! bot-runtime/
//! ├── container/   # BotConfig, BotContainer
//! ├── adapters/    # GuildConfigStore + in-memory adapter
//! ├── handlers/    # MatchFlow, rock-paper-scissors
//! └── runtime.rs   # BotRuntime (waiter loop, shutdown)
//! ```

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use adapters::{GuildConfigStore, InMemoryGuildConfigStore, MatchmakingConfig, StoreError};
pub use container::{BotConfig, BotContainer, ConfigError, ContainerError};
pub use handlers::{FlowError, MatchFlow, MatchHandle, MatchOutcome, MatchRequest, Rps};
pub use runtime::BotRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
