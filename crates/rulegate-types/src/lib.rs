//! Stable DTOs and IDs used across the rulegate workspace.
//!
//! This crate is intentionally boring:
//! - data types for rule/policy execution results
//! - the report envelope emitted by the CLI
//! - stable schema and tool identifiers
//!
//! The execution engine lives in `rulegate-engine`; nothing here evaluates
//! anything.

#![forbid(unsafe_code)]

pub mod envelope;
pub mod ids;
pub mod result;

pub use envelope::{ReportEnvelope, ToolMeta};
pub use result::{engine_version, PolicyExecutionResult, RuleExecutionResult};
