//! Request lifecycle of one interactive analysis.
//!
//! A session moves `Idle -> Pending -> Resolved | Failed`. A new submission from
//! `Resolved` or `Failed` drops the previous outcome before the request is sent.
//! Submissions with a blank schema or query never leave `Idle` and never reach
//! the service.

use crate::client::AnalysisService;
use common::models::{AnalysisResult, AnalyzeRequest, InputMissing, validate_inputs};
use log::{error, warn};
use thiserror::Error;

pub const REQUEST_FAILED_MESSAGE: &str =
    "Failed to analyze the SQL query. The service might be unavailable or the request failed.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Pending,
    Resolved(AnalysisResult),
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    InputMissing(#[from] InputMissing),
    #[error("an analysis is already in progress")]
    Busy,
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SessionState::Pending
    }

    pub fn can_submit(&self, schema: &str, query: &str) -> bool {
        !self.is_pending() && validate_inputs(schema, query).is_ok()
    }

    pub fn begin(&mut self, schema: &str, query: &str) -> Result<AnalyzeRequest, SubmitError> {
        if self.is_pending() {
            return Err(SubmitError::Busy);
        }
        if let Err(err) = validate_inputs(schema, query) {
            self.state = SessionState::Idle;
            return Err(err.into());
        }
        self.state = SessionState::Pending;
        Ok(AnalyzeRequest::new(schema, query))
    }

    pub fn finish(&mut self, outcome: Result<AnalysisResult, anyhow::Error>) {
        if !self.is_pending() {
            warn!("ignoring analysis outcome, no request is pending");
            return;
        }
        self.state = match outcome {
            Ok(result) => SessionState::Resolved(result),
            Err(err) => {
                error!("Analysis failed: {err:#}");
                SessionState::Failed(REQUEST_FAILED_MESSAGE.to_string())
            }
        };
    }

    pub async fn submit<S: AnalysisService>(
        &mut self,
        service: &S,
        schema: &str,
        query: &str,
    ) -> Result<&SessionState, SubmitError> {
        let request = self.begin(schema, query)?;
        let outcome = service.analyze(request).await;
        self.finish(outcome);
        Ok(&self.state)
    }
}
