//! # SetBot
//!
//! Entry point for the bot. Loads configuration and telemetry, validates the
//! embedded catalogs, wires the shared services and waits for Ctrl+C.
//!
//! The platform gateway is not part of this binary: it runs against the
//! recording chat client, which is enough to exercise the flows offline.

use anyhow::{Context, Result};
use bot_runtime::{BotConfig, BotContainer, BotRuntime};
use setbot_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::{ChatClient, RecordingChatClient};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("failed to initialize telemetry")?;

    let config = BotConfig::from_env();
    config.validate().context("invalid configuration")?;

    let chat: Arc<dyn ChatClient> = Arc::new(RecordingChatClient::new());
    let container = BotContainer::new(config, chat).context("failed to build services")?;

    let runtime = BotRuntime::new(container);
    runtime.start();

    info!("Bot is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
