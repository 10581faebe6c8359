//! Groq chat completions

use std::time::Duration;

use crate::openai_compatible::OpenAiCompatibleClient;
use papersmith_core::{Llm, LlmRequest, LlmResponse, PapersmithError};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Clone)]
pub struct GroqClient(OpenAiCompatibleClient);

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, PapersmithError> {
        Self::with_timeout(api_key, Duration::from_secs(90))
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PapersmithError> {
        let client = OpenAiCompatibleClient::builder()
            .base_url(GROQ_BASE_URL)?
            .api_key(api_key)
            .default_model(GROQ_DEFAULT_MODEL)
            .timeout(timeout)
            .build()?;
        Ok(Self(client))
    }

    /// Reads the key from `GROQ_API_KEY`.
    pub fn from_env() -> Result<Self, PapersmithError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| PapersmithError::InvalidConfig("GROQ_API_KEY is not set".to_string()))?;
        Self::new(api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.0.set_default_model(model);
        self
    }
}

#[async_trait::async_trait]
impl Llm for GroqClient {
    async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse, PapersmithError> {
        self.0.invoke(request).await
    }
}
