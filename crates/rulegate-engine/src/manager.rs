//! The policy execution engine.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use rulegate_types::{engine_version, PolicyExecutionResult, RuleExecutionResult};

use crate::error::EngineError;
use crate::model::{Policy, Rule};
use crate::repository::PolicyResultsRepository;
use crate::results::{RuleOutcome, RuleResultBuilder};
use crate::telemetry;

/// Drives rule-by-rule evaluation of one [`Policy`] against request values.
///
/// The policy is read-only for the manager's lifetime, so one manager may
/// serve any number of concurrent executions; the results repository must
/// itself be safe for concurrent invocation.
pub struct PolicyManager<T> {
    policy: Policy<T>,
    repository: Arc<dyn PolicyResultsRepository<T>>,
}

impl<T: Send + Sync> PolicyManager<T> {
    pub fn new(policy: Policy<T>, repository: Arc<dyn PolicyResultsRepository<T>>) -> Self {
        Self { policy, repository }
    }

    pub fn policy(&self) -> &Policy<T> {
        &self.policy
    }

    /// Evaluates every rule of the policy, strictly in declaration order.
    ///
    /// There is no fail-fast: all rules always run to completion for a given
    /// request, and the aggregate `passed` is the AND over all rule outcomes
    /// (vacuously true for an empty rule set). Persistence is best-effort; a
    /// repository fault is logged and absorbed, never surfaced.
    pub async fn execute_policy(
        &self,
        correlation_id: &str,
        execution_context_id: Uuid,
        request: &T,
        token: CancellationToken,
    ) -> PolicyExecutionResult {
        info!(
            "executing [{}]:[{}] for [{}]",
            self.policy.id, self.policy.name, execution_context_id
        );

        let started = Instant::now();

        let mut results = Vec::with_capacity(self.policy.rules.len());
        for rule in &self.policy.rules {
            let result = self
                .execute_rule_inner(rule, execution_context_id, request, token.clone())
                .await;
            results.push(result);
        }

        let passed = results.iter().all(|r| r.passed);
        let result = PolicyExecutionResult {
            rule_context_id: execution_context_id,
            correlation_id: correlation_id.to_string(),
            policy_id: self.policy.id.clone(),
            policy_name: self.policy.name.clone(),
            version: engine_version(),
            rule_execution_results: results,
            passed,
        };

        let elapsed = started.elapsed();

        self.try_persist_results(request, &result).await;
        telemetry::record_policy_execution(&self.policy.id, elapsed);

        result
    }

    /// Evaluates a single rule by id.
    ///
    /// Fails with [`EngineError::RuleNotFound`] if the policy has no such
    /// rule — the one configuration error this engine does not swallow. No
    /// aggregation, no persistence, no policy-level telemetry.
    pub async fn execute_rule(
        &self,
        rule_id: &str,
        correlation_id: &str,
        execution_context_id: Uuid,
        request: &T,
        token: CancellationToken,
    ) -> Result<RuleExecutionResult, EngineError> {
        info!(
            "executing [{rule_id}] for [{execution_context_id}] (correlation [{correlation_id}])"
        );

        let rule = self
            .policy
            .rules
            .iter()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| EngineError::RuleNotFound {
                rule_id: rule_id.to_string(),
            })?;

        Ok(self
            .execute_rule_inner(rule, execution_context_id, request, token)
            .await)
    }

    async fn try_persist_results(&self, request: &T, result: &PolicyExecutionResult) {
        if let Err(err) = self.repository.persist_results(request, result).await {
            error!(
                "an error occurred writing the results for [{}]: {err:#}",
                result.rule_context_id
            );
        }
    }

    /// Shared per-rule evaluation routine.
    ///
    /// Exactly one attempt per call: the predicate's `Ok(true)` is success,
    /// `Ok(false)` is failure (with the lazily generated failure message),
    /// and `Err` is a captured fault that never propagates past the rule.
    async fn execute_rule_inner(
        &self,
        rule: &Rule<T>,
        execution_context_id: Uuid,
        request: &T,
        token: CancellationToken,
    ) -> RuleExecutionResult {
        info!(
            "... executing [{}]:[{}] for [{}]",
            rule.id, rule.name, execution_context_id
        );

        let builder = RuleResultBuilder::new(&rule.id, &rule.name, rule.description.as_deref());

        let started = Instant::now();
        let outcome = match (rule.source)(request, token).await {
            Ok(true) => RuleOutcome::Passed,
            Ok(false) => RuleOutcome::Failed(
                rule.failure_message.as_ref().map(|message| message(request)),
            ),
            Err(err) => {
                error!(
                    "an error occurred executing [{}]:[{}]: {err:#}",
                    rule.id, rule.name
                );
                RuleOutcome::Faulted(err)
            }
        };
        let elapsed = started.elapsed();

        telemetry::record_rule_execution(&self.policy.id, &rule.id, elapsed);

        builder.finish(outcome, elapsed)
    }
}
