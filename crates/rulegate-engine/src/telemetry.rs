//! Timing telemetry emitted through the `metrics` facade.
//!
//! Two duration histograms, keyed per policy id and per policy:rule pair.
//! With no recorder installed these are no-ops; aggregation and export are
//! the recorder's concern, not the engine's.

use std::time::Duration;

use rulegate_types::ids::{METRIC_POLICY_DURATION_MS, METRIC_RULE_DURATION_MS};

pub fn record_policy_execution(policy_id: &str, elapsed: Duration) {
    metrics::histogram!(
        METRIC_POLICY_DURATION_MS,
        "policy_id" => policy_id.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}

pub fn record_rule_execution(policy_id: &str, rule_id: &str, elapsed: Duration) {
    metrics::histogram!(
        METRIC_RULE_DURATION_MS,
        "policy_id" => policy_id.to_string(),
        "rule_id" => rule_id.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}
