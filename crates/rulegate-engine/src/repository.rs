//! Persistence collaborator for finished execution results.

use async_trait::async_trait;

use rulegate_types::PolicyExecutionResult;

/// Sink for execution results, invoked once per whole-policy execution.
///
/// The engine treats any fault from [`persist_results`] as non-fatal: it is
/// logged at error level and the execution result is still returned to the
/// caller unaffected. Implementations must be safe for concurrent invocation
/// if the owning manager is shared across callers.
///
/// [`persist_results`]: PolicyResultsRepository::persist_results
#[async_trait]
pub trait PolicyResultsRepository<T>: Send + Sync {
    async fn persist_results(
        &self,
        request: &T,
        results: &PolicyExecutionResult,
    ) -> anyhow::Result<()>;
}

/// Default repository: discards results.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultResultsRepository;

#[async_trait]
impl<T: Send + Sync> PolicyResultsRepository<T> for DefaultResultsRepository {
    async fn persist_results(
        &self,
        _request: &T,
        results: &PolicyExecutionResult,
    ) -> anyhow::Result<()> {
        tracing::debug!("discarding execution results for [{}]", results.rule_context_id);
        Ok(())
    }
}
