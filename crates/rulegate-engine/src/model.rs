//! Rule and policy descriptors.
//!
//! Both are immutable after construction. A [`Policy`] owns its rules; the
//! rule order is the evaluation order and the result order.

use std::fmt;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

/// The predicate of a rule: an async boolean check over the request.
///
/// An `Err` return is a predicate *fault* (the moral equivalent of a thrown
/// exception) and is captured into the rule's result by the engine.
pub type RuleSource<T> = Box<
    dyn for<'a> Fn(&'a T, CancellationToken) -> BoxFuture<'a, anyhow::Result<bool>>
        + Send
        + Sync,
>;

/// Produces a human-readable failure message from the request. Only invoked
/// when the rule's predicate completes with `false`.
pub type FailureMessage<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// A single named boolean check, executed as part of a policy.
pub struct Rule<T> {
    /// Id of the rule, unique within its policy.
    pub id: String,
    /// Name of the rule.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    pub(crate) failure_message: Option<FailureMessage<T>>,
    pub(crate) source: RuleSource<T>,
}

impl<T> Rule<T> {
    pub fn new<S>(id: impl Into<String>, name: impl Into<String>, source: S) -> Self
    where
        S: for<'a> Fn(&'a T, CancellationToken) -> BoxFuture<'a, anyhow::Result<bool>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            failure_message: None,
            source: Box::new(source),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_failure_message<F>(mut self, failure_message: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.failure_message = Some(Box::new(failure_message));
        self
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A named, ordered set of rules evaluated against one input.
pub struct Policy<T> {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Rules in declaration order. Order is significant and preserved in
    /// execution results.
    pub rules: Vec<Rule<T>>,
}

impl<T> Policy<T> {
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> PolicyBuilder<T> {
        PolicyBuilder::new(id, name)
    }
}

impl<T> fmt::Debug for Policy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Fluent assembly sugar for a [`Policy`].
///
/// Rule ids are expected to be unique within the policy; the builder does
/// not deduplicate.
pub struct PolicyBuilder<T> {
    id: String,
    name: String,
    description: Option<String>,
    rules: Vec<Rule<T>>,
}

impl<T> PolicyBuilder<T> {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            rules: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn rule(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> Policy<T> {
        Policy {
            id: self.id,
            name: self.name,
            description: self.description,
            rules: self.rules,
        }
    }
}
