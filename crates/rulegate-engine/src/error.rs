//! Error taxonomy for the engine.
//!
//! Faults raised by rule *logic* never appear here — they are captured into
//! the rule's execution result. These types cover misuse of the API surface
//! itself.

use thiserror::Error;

/// Configuration errors surfaced by [`crate::PolicyManager`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Single-rule execution was requested for an id the policy does not
    /// contain.
    #[error("no rule with id [{rule_id}] was found")]
    RuleNotFound { rule_id: String },
}

/// Input validation errors raised by [`crate::NestedLookup`].
///
/// These are programming errors on the caller's side and are raised
/// synchronously, never caught internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// An item was inserted with an empty key path.
    #[error("lookup key paths cannot be empty")]
    EmptyKeyPath,

    /// The stored value's kind cannot be coerced to the requested type.
    #[error("stored {from} value cannot be coerced to {to}")]
    Coercion {
        from: &'static str,
        to: &'static str,
    },
}
