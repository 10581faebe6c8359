use std::{error::Error as StdError, fmt, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PapersmithError {
    #[error("LLM provider failed: {0}")]
    LlmProvider(String),
    #[error("Parsing failed on output '{output}': {reason}")]
    ParseFailed { output: String, reason: String },
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl From<EmbeddingError> for PapersmithError {
    fn from(err: EmbeddingError) -> Self {
        PapersmithError::Custom(err.to_string())
    }
}

impl From<StoreError> for PapersmithError {
    fn from(err: StoreError) -> Self {
        PapersmithError::Custom(err.to_string())
    }
}

#[derive(Debug)]
pub enum EmbeddingError {
    InvalidResponse(String),
    RateLimited { retry_after: Option<Duration> },
    Timeout(Duration),
    Provider(String),
    Other(Box<dyn StdError + Send + Sync>),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingError::InvalidResponse(message) => {
                write!(f, "Embedding invalid response: {message}")
            }
            EmbeddingError::RateLimited { retry_after } => match retry_after {
                Some(duration) => write!(f, "Embedding rate limited (retry_after={duration:?})"),
                None => write!(f, "Embedding rate limited (retry_after=unknown)"),
            },
            EmbeddingError::Timeout(duration) => write!(f, "Embedding timeout after {duration:?}"),
            EmbeddingError::Provider(message) => write!(f, "Embedding provider error: {message}"),
            EmbeddingError::Other(error) => write!(f, "Embedding error: {error}"),
        }
    }
}

impl StdError for EmbeddingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EmbeddingError::Other(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid record id: {0}")]
    InvalidId(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("chunk '{0}' has no embedding")]
    MissingEmbedding(String),
    #[error("Store error: {0}")]
    Internal(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<ParseEnumError> for StoreError {
    fn from(err: ParseEnumError) -> Self {
        StoreError::Internal(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("OCR provider failed: {0}")]
    Provider(String),
    #[error("OCR timed out after {0:?}")]
    Timeout(Duration),
    #[error("OCR produced no text")]
    EmptyOutput,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} value: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("expected exactly 4 options, got {0}")]
    OptionCount(usize),
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("marks {got} outside allowed range {min}..={max}")]
    MarksOutOfRange { min: u32, max: u32, got: u32 },
    #[error("unit number must be at least 1")]
    InvalidUnit,
}
