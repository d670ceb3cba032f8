//! Stable identifiers for report schemas and telemetry keys.

/// Schema identifier stamped into every report envelope.
pub const SCHEMA_REPORT_V1: &str = "rulegate.report.v1";

/// Tool name stamped into report envelopes.
pub const TOOL_NAME: &str = "rulegate";

/// Histogram recording whole-policy execution time, labelled by `policy_id`.
pub const METRIC_POLICY_DURATION_MS: &str = "rulegate.policy.duration_ms";

/// Histogram recording per-rule execution time, labelled by `policy_id` and
/// `rule_id`.
pub const METRIC_RULE_DURATION_MS: &str = "rulegate.rule.duration_ms";
