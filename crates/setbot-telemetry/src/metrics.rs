//! Prometheus metrics for SetBot.
//!
//! All metrics follow the naming convention: `sb_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SESSION METRICS (Subsystem 1)
    // =========================================================================

    /// Sessions displayed
    pub static ref SESSIONS_OPENED: CounterVec = CounterVec::new(
        Opts::new("sb_sessions_opened_total", "Interactive sessions displayed"),
        &["kind"]  // kind: buttons/selection/confirmable
    ).expect("metric creation failed");

    /// Sessions that ended by timeout
    pub static ref SESSION_TIMEOUTS: Counter = Counter::new(
        "sb_sessions_timeouts_total",
        "Sessions that ended without a terminal interaction"
    ).expect("metric creation failed");

    /// Interactions from users not allowed to use a session
    pub static ref INTERACTIONS_REJECTED: Counter = Counter::new(
        "sb_sessions_interactions_rejected_total",
        "Interactions rejected because the user is not permitted"
    ).expect("metric creation failed");

    /// Timeout callbacks that failed or panicked
    pub static ref CALLBACK_FAILURES: Counter = Counter::new(
        "sb_sessions_callback_failures_total",
        "Timeout callbacks that returned an error or panicked"
    ).expect("metric creation failed");

    // =========================================================================
    // CHOICE COLLECTION METRICS (Subsystem 2)
    // =========================================================================

    /// Choice waits by outcome
    pub static ref CHOICE_WAITS: CounterVec = CounterVec::new(
        Opts::new("sb_choices_waits_total", "Multi-party choice waits"),
        &["outcome"]  // outcome: started/completed/timed_out/rejected/cancelled
    ).expect("metric creation failed");

    /// Participants currently being waited on
    pub static ref ACTIVE_PARTICIPANTS: Gauge = Gauge::new(
        "sb_choices_active_participants",
        "Participants with an outstanding choice"
    ).expect("metric creation failed");

    // =========================================================================
    // MATCH METRICS (Subsystem 3)
    // =========================================================================

    /// Matches started
    pub static ref MATCHES_STARTED: Counter = Counter::new(
        "sb_matches_started_total",
        "Sets started"
    ).expect("metric creation failed");

    /// Matches finished, by outcome
    pub static ref MATCHES_FINISHED: CounterVec = CounterVec::new(
        Opts::new("sb_matches_finished_total", "Sets finished"),
        &["outcome"]  // outcome: completed/aborted
    ).expect("metric creation failed");

    /// Transitions attempted with a superseded phase token
    pub static ref STALE_PHASE_ERRORS: Counter = Counter::new(
        "sb_matches_stale_phase_errors_total",
        "Transitions rejected because the phase had already moved on"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Sessions
        Box::new(SESSIONS_OPENED.clone()),
        Box::new(SESSION_TIMEOUTS.clone()),
        Box::new(INTERACTIONS_REJECTED.clone()),
        Box::new(CALLBACK_FAILURES.clone()),
        // Choice collection
        Box::new(CHOICE_WAITS.clone()),
        Box::new(ACTIVE_PARTICIPANTS.clone()),
        // Matches
        Box::new(MATCHES_STARTED.clone()),
        Box::new(MATCHES_FINISHED.clone()),
        Box::new(STALE_PHASE_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
