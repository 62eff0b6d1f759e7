use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Verdict on a query, judged against the schema it was submitted with.
///
/// All three fields are required when decoding; a response missing one of them
/// or carrying a field of the wrong type is rejected as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_buggy: bool,
    pub bug_description: String,
    pub suggested_fix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub schema: String,
    pub query: String,
}

impl AnalyzeRequest {
    pub fn new(schema: impl Into<String>, query: impl Into<String>) -> Self {
        AnalyzeRequest {
            schema: schema.into(),
            query: query.into(),
        }
    }

    pub fn validate(&self) -> Result<(), InputMissing> {
        validate_inputs(&self.schema, &self.query)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Please provide both a database schema and an SQL query.")]
pub struct InputMissing;

pub fn validate_inputs(schema: &str, query: &str) -> Result<(), InputMissing> {
    if schema.trim().is_empty() || query.trim().is_empty() {
        return Err(InputMissing);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}
