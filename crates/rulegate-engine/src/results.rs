//! Construction of frozen rule execution results.

use std::time::Duration;

use rulegate_types::RuleExecutionResult;

/// The single outcome of one rule attempt. A rule evaluation takes exactly
/// one of these paths.
#[derive(Debug)]
pub(crate) enum RuleOutcome {
    Passed,
    /// Predicate completed with `false`; carries the generated failure
    /// message, if the rule configured one.
    Failed(Option<String>),
    /// Predicate raised a fault (including observed cancellation).
    Faulted(anyhow::Error),
}

/// Owned-state accumulator for a [`RuleExecutionResult`], converted into the
/// immutable record exactly once. Taking the outcome and the elapsed time as
/// finalizer arguments keeps "one outcome path, elapsed always set"
/// structurally true.
pub(crate) struct RuleResultBuilder {
    id: String,
    name: String,
    description: Option<String>,
}

impl RuleResultBuilder {
    pub(crate) fn new(id: &str, name: &str, description: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    pub(crate) fn finish(self, outcome: RuleOutcome, elapsed: Duration) -> RuleExecutionResult {
        // A captured fault supersedes any custom failure message.
        let (passed, message, error) = match outcome {
            RuleOutcome::Passed => (true, None, None),
            RuleOutcome::Failed(message) => (false, message, None),
            RuleOutcome::Faulted(err) => (false, Some(err.to_string()), Some(err)),
        };

        RuleExecutionResult {
            id: self.id,
            name: self.name,
            description: self.description,
            passed,
            elapsed,
            message,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_outcome_sets_no_message() {
        let result = RuleResultBuilder::new("R001", "rule", None)
            .finish(RuleOutcome::Passed, Duration::from_millis(5));
        assert!(result.passed);
        assert!(result.message.is_none());
        assert!(result.error.is_none());
        assert_eq!(result.elapsed, Duration::from_millis(5));
    }

    #[test]
    fn failure_outcome_keeps_generated_message() {
        let result = RuleResultBuilder::new("R001", "rule", Some("desc"))
            .finish(RuleOutcome::Failed(Some("too young".into())), Duration::ZERO);
        assert!(!result.passed);
        assert_eq!(result.message.as_deref(), Some("too young"));
        assert!(result.error.is_none());
        assert_eq!(result.description.as_deref(), Some("desc"));
    }

    #[test]
    fn faulted_outcome_takes_the_fault_description() {
        let result = RuleResultBuilder::new("R001", "rule", None).finish(
            RuleOutcome::Faulted(anyhow::anyhow!("upstream unavailable")),
            Duration::from_millis(1),
        );
        assert!(!result.passed);
        assert_eq!(result.message.as_deref(), Some("upstream unavailable"));
        assert!(result.error.is_some());
    }
}
