use std::fmt;

use papersmith_core::{OcrError, PapersmithError, StoreError};
use papersmith_retrieval::RetrievalError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: String, value: String },
    #[error("invalid pipeline configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("text extraction error: {0}")]
    Ocr(#[from] OcrError),
    #[error("completion error: {0}")]
    Completion(#[from] PapersmithError),
}

impl PipelineError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        PipelineError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Failure summary shown to callers polling a generation job. Carries a
/// short message only, never the collaborator's payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobError {
    message: String,
}

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&PipelineError> for JobError {
    fn from(error: &PipelineError) -> Self {
        let message = match error {
            PipelineError::NotFound { kind, .. } => format!("{kind} no longer exists"),
            PipelineError::Validation(message) | PipelineError::Conflict(message) => {
                message.clone()
            }
            PipelineError::Config(_) => "pipeline is misconfigured".to_string(),
            PipelineError::Store(_) => "failed to save generation results".to_string(),
            PipelineError::Retrieval(_) => "failed to retrieve reference content".to_string(),
            PipelineError::Ocr(_) => "text extraction failed".to_string(),
            PipelineError::Completion(PapersmithError::Timeout(_)) => {
                "question generation timed out".to_string()
            }
            PipelineError::Completion(_) => "question generation failed".to_string(),
        };
        JobError::new(message)
    }
}
