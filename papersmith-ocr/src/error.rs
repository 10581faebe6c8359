use papersmith_core::OcrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrProviderError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<OcrProviderError> for OcrError {
    fn from(error: OcrProviderError) -> Self {
        OcrError::Provider(error.to_string())
    }
}
