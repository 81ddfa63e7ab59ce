//! Error types for the insights module

use rig::completion::PromptError;
use thiserror::Error;

use crate::error::Error as CrateError;

/// Error type for a single insight category
#[derive(Debug, Error)]
pub enum InsightError {
    /// The completion backend failed
    #[error("LLM error: {0}")]
    Llm(#[from] PromptError),

    /// The backend answered with nothing
    #[error("empty response from model")]
    EmptyResponse,

    /// No repair stage recovered enough fields
    #[error("could not recover structured fields from response")]
    Unparsable,

    /// No backend is configured
    #[error("AI backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl From<InsightError> for CrateError {
    fn from(err: InsightError) -> Self {
        CrateError::Insight(err.to_string())
    }
}
