//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use crate::workflow::WorkflowAction;
use metrics::{counter, describe_counter, describe_histogram, Unit};

/// Metrics prefix for all Pressroom metrics
pub const METRICS_PREFIX: &str = "pressroom";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Workflow metrics
    describe_counter!(
        format!("{}_workflow_transitions_total", METRICS_PREFIX),
        Unit::Count,
        "Workflow transition attempts by action and outcome"
    );

    describe_counter!(
        format!("{}_notifications_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total notification rows persisted"
    );

    tracing::info!("Metrics registered");
}

/// Record a workflow transition attempt.
///
/// Outcome is one of `applied`, `denied`, `conflict`.
pub fn record_transition(action: WorkflowAction, outcome: &'static str) {
    counter!(
        format!("{}_workflow_transitions_total", METRICS_PREFIX),
        "action" => action.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a persisted notification row
pub fn record_notification_created() {
    counter!(format!("{}_notifications_created_total", METRICS_PREFIX)).increment(1);
}
