//! Generic OpenAI-compatible LLM client
//!
//! Supports any provider using OpenAI's chat completions format (Groq,
//! OpenAI, Together, a local vLLM, etc.)

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use url::Url;

use papersmith_core::{Llm, LlmRequest, LlmResponse, Message, PapersmithError, ResponseFormat};

/// Request body for chat completions endpoint
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    pub stream: bool,
}

/// Non-streaming response from chat completions
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI-style error response
#[derive(Deserialize, Debug, Clone)]
pub struct OpenAiError {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    base_url: Url,
    api_key: SecretString,
    default_model: String,
    timeout: Duration,
}

impl OpenAiCompatibleClient {
    pub fn builder() -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder::default()
    }

    pub fn set_default_model(&mut self, model: impl Into<String>) {
        self.default_model = model.into();
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    fn map_send_error(&self, err: reqwest::Error) -> PapersmithError {
        if err.is_timeout() {
            PapersmithError::Timeout(self.timeout)
        } else {
            PapersmithError::LlmProvider(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl Llm for OpenAiCompatibleClient {
    async fn invoke(&self, input: LlmRequest) -> Result<LlmResponse, PapersmithError> {
        let LlmRequest {
            model,
            messages,
            temperature,
            max_tokens,
            response_format,
        } = input;
        let model = if model.is_empty() {
            self.default_model.clone()
        } else {
            model
        };
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature,
            max_tokens,
            response_format,
            stream: false,
        };

        let span = tracing::info_span!(
            "chat_completion",
            model = %request.model,
            max_tokens = ?request.max_tokens
        );
        async move {
            let response = self
                .http
                .post(self.endpoint())
                .bearer_auth(self.api_key.expose_secret())
                .json(&request)
                .send()
                .await
                .map_err(|err| self.map_send_error(err))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|parsed| parsed.error.message)
                    .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
                return Err(match status {
                    StatusCode::TOO_MANY_REQUESTS => {
                        PapersmithError::LlmProvider(format!("rate limited: {message}"))
                    }
                    _ => PapersmithError::LlmProvider(format!("HTTP {status}: {message}")),
                });
            }

            let body: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|err| self.map_send_error(err))?;
            if let Some(usage) = &body.usage {
                tracing::debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "completion usage"
                );
            }

            let content = body
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| {
                    PapersmithError::LlmProvider("completion contained no message".to_string())
                })?;
            Ok::<_, PapersmithError>(LlmResponse { content })
        }
        .instrument(span)
        .await
    }
}

pub struct OpenAiCompatibleBuilder {
    base_url: Option<Url>,
    api_key: Option<SecretString>,
    default_model: Option<String>,
    timeout: Duration,
}

impl Default for OpenAiCompatibleBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            default_model: None,
            timeout: Duration::from_secs(90),
        }
    }
}

impl OpenAiCompatibleBuilder {
    pub fn base_url(mut self, value: impl AsRef<str>) -> Result<Self, PapersmithError> {
        let url = Url::parse(value.as_ref())
            .map_err(|err| PapersmithError::InvalidConfig(format!("invalid base_url: {err}")))?;
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(value.into()));
        self
    }

    pub fn default_model(mut self, value: impl Into<String>) -> Self {
        self.default_model = Some(value.into());
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn api_key_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.api_key = Some(SecretString::new(value));
        }
        self
    }

    pub fn base_url_from_env(self, var_name: &str) -> Result<Self, PapersmithError> {
        match std::env::var(var_name) {
            Ok(value) => self.base_url(value),
            Err(_) => Ok(self),
        }
    }

    pub fn build(self) -> Result<OpenAiCompatibleClient, PapersmithError> {
        let base_url = self
            .base_url
            .ok_or_else(|| PapersmithError::InvalidConfig("base_url is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| PapersmithError::InvalidConfig("api_key is required".to_string()))?;
        let default_model = self.default_model.ok_or_else(|| {
            PapersmithError::InvalidConfig("default_model is required".to_string())
        })?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| PapersmithError::InvalidConfig(err.to_string()))?;

        Ok(OpenAiCompatibleClient {
            http,
            base_url,
            api_key,
            default_model,
            timeout: self.timeout,
        })
    }
}
