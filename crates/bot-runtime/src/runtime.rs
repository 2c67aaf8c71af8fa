//! # Bot Runtime
//!
//! Wires the container, feeds plain messages to the choice waiter, and keeps
//! track of running sets so they can be stopped on shutdown.
//!
//! ## Event Flow
//!
//! ```text
//! platform ──publish──► EventBroker ─┬─ one-shot waits ──► menu sessions
//!                                    └─ message stream ──► MultiPartyChoiceWaiter
//! ```

use crate::container::BotContainer;
use crate::handlers::{FlowError, MatchFlow, MatchHandle, MatchRequest};
use parking_lot::Mutex;
use shared_bus::EventFilter;
use shared_types::InteractionEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Grace period for in-flight callbacks after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// The running bot.
pub struct BotRuntime {
    container: Arc<BotContainer>,
    matches: Mutex<Vec<MatchHandle>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl BotRuntime {
    pub fn new(container: BotContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            matches: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start the background loops.
    pub fn start(&self) {
        info!("===========================================");
        info!("  SetBot Runtime v{}", crate::VERSION);
        info!("===========================================");

        let waiter = Arc::clone(&self.container.waiter);
        let subscription = self
            .container
            .broker
            .subscribe(EventFilter::messages_only());
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = waiter.run(subscription) => {}
                _ = shutdown.changed() => {
                    info!("[choice-waiter] Shutdown signal received");
                }
            }
        });

        info!(
            default_ruleset = %self.container.config.default_ruleset,
            "Bot runtime started"
        );
    }

    /// Hand an incoming platform event to the broker.
    pub async fn dispatch(&self, event: InteractionEvent) -> usize {
        self.container.broker.publish(event).await
    }

    /// Start a set and keep its handle until shutdown.
    pub async fn start_match(&self, request: MatchRequest) -> Result<MatchHandle, FlowError> {
        let handle = MatchFlow::start(Arc::clone(&self.container), request).await?;
        let mut matches = self.matches.lock();
        matches.retain(|m| m.outcome().is_none());
        matches.push(handle.clone());
        Ok(handle)
    }

    /// Sets that have not ended yet.
    pub fn active_matches(&self) -> Vec<MatchHandle> {
        self.matches
            .lock()
            .iter()
            .filter(|m| m.outcome().is_none())
            .cloned()
            .collect()
    }

    /// Stop the loops and abandon every running set.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        let running: Vec<MatchHandle> = std::mem::take(&mut *self.matches.lock());
        for handle in running {
            handle.abandon("the bot is shutting down").await;
        }

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        tokio::time::sleep(SHUTDOWN_GRACE).await;

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<BotContainer> {
        Arc::clone(&self.container)
    }
}
