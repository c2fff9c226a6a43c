// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::{configure, serve_metrics};

// ============================================================================
// Metrics Module - Prometheus metrics for the storefront core
// ============================================================================
//
// Provides metrics for:
// - Wizard step transitions and validation failures
// - Photo rejections
// - Order submissions (outcome, latency)
// - Session lifecycle (login, logout, token refresh)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Wizard Metrics
    pub step_transitions: IntCounterVec,
    pub validation_failures: IntCounterVec,
    pub photo_rejections: IntCounter,

    // Submission Metrics
    pub submissions: IntCounterVec,
    pub submission_duration: HistogramVec,

    // Session Metrics
    pub session_events: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let step_transitions = IntCounterVec::new(
            Opts::new("wizard_step_transitions_total", "Wizard step changes"),
            &["from", "to"],
        )?;
        registry.register(Box::new(step_transitions.clone()))?;

        let validation_failures = IntCounterVec::new(
            Opts::new("wizard_validation_failures_total", "Blocked advances by failing section"),
            &["section"],
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let photo_rejections = IntCounter::new(
            "wizard_photo_rejections_total",
            "Photos rejected on attach",
        )?;
        registry.register(Box::new(photo_rejections.clone()))?;

        let submissions = IntCounterVec::new(
            Opts::new("order_submissions_total", "Order submissions by outcome"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        let submission_duration = HistogramVec::new(
            HistogramOpts::new("order_submission_duration_seconds", "Order service round trip")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["kind"],
        )?;
        registry.register(Box::new(submission_duration.clone()))?;

        let session_events = IntCounterVec::new(
            Opts::new("session_events_total", "Session lifecycle events"),
            &["event"],
        )?;
        registry.register(Box::new(session_events.clone()))?;

        Ok(Self {
            registry,
            step_transitions,
            validation_failures,
            photo_rejections,
            submissions,
            submission_duration,
            session_events,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_step_transition(&self, from: &str, to: &str) {
        self.step_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_validation_failure(&self, section: &str) {
        self.validation_failures.with_label_values(&[section]).inc();
    }

    pub fn record_photo_rejection(&self) {
        self.photo_rejections.inc();
    }

    pub fn record_submission(&self, kind: &str, outcome: &str, duration_secs: f64) {
        self.submissions.with_label_values(&[kind, outcome]).inc();
        self.submission_duration.with_label_values(&[kind]).observe(duration_secs);
    }

    pub fn record_session_event(&self, event: &str) {
        self.session_events.with_label_values(&[event]).inc();
    }
}
