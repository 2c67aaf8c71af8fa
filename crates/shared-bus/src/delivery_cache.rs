//! # Time-Bounded Delivery Cache
//!
//! Guards against the platform delivering the same interaction twice (the
//! gateway replays events after a resume). Each interaction id is remembered
//! for a fixed window and then garbage-collected, which bounds memory.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from delivery cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The interaction was already delivered inside the window.
    #[error("Interaction {interaction_id} was already delivered")]
    Duplicate { interaction_id: u64 },
}

/// Time-bounded cache of delivered interaction ids.
///
/// - Validity window: 15 minutes (the platform's interaction token lifetime)
/// - Garbage collection: at most every 30s, piggybacked on inserts
pub struct TimeBoundedDeliveryCache {
    /// Interaction id -> first delivery time.
    cache: HashMap<u64, Instant>,

    /// How long an id is remembered.
    validity_window: Duration,

    /// Last garbage collection.
    last_gc: Instant,

    /// Minimum time between garbage collections.
    gc_interval: Duration,
}

impl TimeBoundedDeliveryCache {
    /// Default validity window.
    pub const DEFAULT_VALIDITY_WINDOW: Duration = Duration::from_secs(15 * 60);

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(30);

    /// Create a cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_VALIDITY_WINDOW, Self::DEFAULT_GC_INTERVAL)
    }

    /// Create a cache with custom settings.
    #[must_use]
    pub fn with_config(validity_window: Duration, gc_interval: Duration) -> Self {
        Self {
            cache: HashMap::new(),
            validity_window,
            last_gc: Instant::now(),
            gc_interval,
        }
    }

    /// Record a delivery, rejecting ids already seen inside the window.
    ///
    /// # Errors
    ///
    /// - `DeliveryError::Duplicate` - The id was delivered before
    pub fn check_and_add(&mut self, interaction_id: u64) -> Result<(), DeliveryError> {
        let now = Instant::now();

        if now.duration_since(self.last_gc) >= self.gc_interval {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if let Some(seen) = self.cache.get(&interaction_id) {
            if now.duration_since(*seen) < self.validity_window {
                return Err(DeliveryError::Duplicate { interaction_id });
            }
        }

        self.cache.insert(interaction_id, now);
        Ok(())
    }

    /// Check if an id is cached without adding it.
    #[must_use]
    pub fn contains(&self, interaction_id: u64) -> bool {
        self.cache.contains_key(&interaction_id)
    }

    /// Number of cached ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn garbage_collect(&mut self, now: Instant) {
        let window = self.validity_window;
        self.cache
            .retain(|_, seen| now.duration_since(*seen) < window);
    }
}

impl Default for TimeBoundedDeliveryCache {
    fn default() -> Self {
        Self::new()
    }
}
