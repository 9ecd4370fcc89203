//! Metrics and observability utilities
//!
//! Thin helpers over the `metrics` facade with standardized naming.
//! Exporter wiring (Prometheus, OTLP) belongs to the hosting console.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all workflow metrics
pub const METRICS_PREFIX: &str = "auditflow";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total explanation requests created"
    );

    describe_counter!(
        format!("{}_requests_completed_total", METRICS_PREFIX),
        Unit::Count,
        "Total explanation requests completed"
    );

    describe_counter!(
        format!("{}_requests_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total explanation requests deleted"
    );

    describe_counter!(
        format!("{}_files_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total files uploaded through the attachment lifecycle"
    );

    describe_counter!(
        format!("{}_upload_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total upload failures"
    );

    describe_histogram!(
        format!("{}_upload_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Upload latency in seconds"
    );

    describe_counter!(
        format!("{}_content_entries_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total content entries submitted"
    );

    describe_counter!(
        format!("{}_content_entries_evaluated_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviewer decisions recorded"
    );

    tracing::info!("Metrics registered");
}

/// Record an upload attempt
pub fn record_upload(duration_secs: f64, success: bool) {
    if success {
        counter!(format!("{}_files_uploaded_total", METRICS_PREFIX)).increment(1);
        histogram!(format!("{}_upload_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    } else {
        counter!(format!("{}_upload_errors_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a reviewer decision
pub fn record_evaluation(outcome: &str) {
    counter!(
        format!("{}_content_entries_evaluated_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
