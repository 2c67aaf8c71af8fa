//! Dependency container and configuration.

pub mod config;
pub mod services;

pub use config::{BotConfig, ConfigError};
pub use services::{BotContainer, ContainerError};
