//! Report envelope written by the CLI around a policy execution result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::result::PolicyExecutionResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Envelope for a serialized execution report artifact.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope {
    /// Schema identifier, see [`crate::ids::SCHEMA_REPORT_V1`].
    pub schema: String,
    pub tool: ToolMeta,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub finished_at: OffsetDateTime,
    pub result: PolicyExecutionResult,
}
