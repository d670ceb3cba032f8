//! Sequential rule/policy execution engine.
//!
//! A [`Policy`] is a named, ordered collection of boolean rules evaluated
//! against a single request value. [`PolicyManager`] drives the evaluation:
//! every rule runs exactly once, strictly in declaration order, with its own
//! timing and fault isolation — a predicate fault becomes a failed
//! [`rulegate_types::RuleExecutionResult`], never an aborted run. Rule
//! authors parameterize thresholds through [`NestedLookup`], a key-path value
//! tree with lazy-create navigation.
//!
//! The engine performs no I/O of its own: results persistence is delegated
//! to a [`PolicyResultsRepository`], diagnostics go through `tracing`, and
//! timing telemetry through the `metrics` facade.

#![forbid(unsafe_code)]

pub mod error;
pub mod lookup;
pub mod manager;
pub mod model;
pub mod repository;
mod results;
pub mod telemetry;

pub use error::{EngineError, LookupError};
pub use lookup::{LookupValue, NestedLookup};
pub use manager::PolicyManager;
pub use model::{Policy, PolicyBuilder, Rule};
pub use repository::{DefaultResultsRepository, PolicyResultsRepository};

/// Cooperative cancellation signal handed to every rule predicate.
pub use tokio_util::sync::CancellationToken;
