//! Execution result records produced by the engine.
//!
//! These are write-once records: the engine builds them, freezes them, and
//! hands them to callers, the results repository, and the CLI report
//! envelope. Captured predicate faults are kept as live `anyhow::Error`
//! values and serialized as their display form.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Engine version string in `major.minor.build.revision` form.
pub fn engine_version() -> String {
    concat!(env!("CARGO_PKG_VERSION"), ".0").to_string()
}

/// The outcome of evaluating a single rule against one request.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RuleExecutionResult {
    /// Id of the rule, copied from the rule at execution time.
    pub id: String,
    /// Name of the rule.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the rule passed.
    pub passed: bool,
    /// Time taken to execute the rule, in milliseconds on the wire.
    #[serde(with = "duration_ms")]
    #[schemars(with = "f64")]
    pub elapsed: Duration,
    /// Failure message, if the rule failed and one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Fault captured from the rule predicate, if it raised one.
    #[serde(default, with = "fault", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub error: Option<anyhow::Error>,
}

/// The aggregate outcome of evaluating a whole policy against one request.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PolicyExecutionResult {
    /// Caller-supplied handle identifying this evaluation run.
    #[schemars(with = "String")]
    pub rule_context_id: Uuid,
    /// Caller-supplied string used to trace the execution across systems.
    pub correlation_id: String,
    pub policy_id: String,
    pub policy_name: String,
    /// Engine version, `major.minor.build.revision`.
    pub version: String,
    /// One entry per rule, in policy declaration order.
    pub rule_execution_results: Vec<RuleExecutionResult>,
    /// Logical AND over all rule results; true for an empty rule set.
    pub passed: bool,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(ms / 1000.0))
    }
}

mod fault {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        err: &Option<anyhow::Error>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match err {
            Some(e) => s.serialize_some(&format!("{e:#}")),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<anyhow::Error>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.map(anyhow::Error::msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule_result() -> RuleExecutionResult {
        RuleExecutionResult {
            id: "R001".to_string(),
            name: "test rule".to_string(),
            description: Some("test description".to_string()),
            passed: false,
            elapsed: Duration::from_millis(42),
            message: Some("boom".to_string()),
            error: Some(anyhow::anyhow!("boom")),
        }
    }

    #[test]
    fn engine_version_has_four_parts() {
        assert_eq!(engine_version().split('.').count(), 4);
    }

    #[test]
    fn rule_result_serializes_fault_as_display_form() {
        let json = serde_json::to_value(sample_rule_result()).unwrap();
        assert_eq!(json["error"], "boom");
        assert_eq!(json["elapsed"], 42.0);
    }

    #[test]
    fn rule_result_round_trips() {
        let json = serde_json::to_string(&sample_rule_result()).unwrap();
        let back: RuleExecutionResult = serde_json::from_str(&json).unwrap();
        assert!(!back.passed);
        assert_eq!(back.error.unwrap().to_string(), "boom");
        assert_eq!(back.elapsed, Duration::from_millis(42));
    }

    #[test]
    fn passing_rule_result_omits_optional_fields() {
        let result = RuleExecutionResult {
            id: "R001".to_string(),
            name: "test rule".to_string(),
            description: None,
            passed: true,
            elapsed: Duration::from_millis(1),
            message: None,
            error: None,
        };
        let json = serde_json::to_value(result).unwrap();
        assert!(json.get("message").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("description").is_none());
    }
}
