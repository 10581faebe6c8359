//! Embeddings over any OpenAI-compatible `/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::EmbeddingProviderError;
use papersmith_core::{Embedding, EmbeddingError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAiEmbedding {
    base_url: String,
    api_key: SecretString,
    model: String,
    dimension: usize,
    http: Client,
}

impl OpenAiEmbedding {
    pub fn builder() -> OpenAiEmbeddingBuilder {
        OpenAiEmbeddingBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedding for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut out = self.embed_batch(&[text.to_string()]).await?;
        out.pop().ok_or_else(|| {
            EmbeddingProviderError::InvalidResponse("missing embedding".to_string()).into()
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(EmbeddingError::RateLimited { retry_after });
        }

        let mut body: EmbeddingResponse = response
            .error_for_status()
            .map_err(|err| EmbeddingProviderError::Request(err.to_string()))?
            .json()
            .await
            .map_err(|err| EmbeddingProviderError::InvalidResponse(err.to_string()))?;

        body.data.sort_by_key(|item| item.index);
        let vectors: Vec<Vec<f32>> = body.data.into_iter().map(|item| item.embedding).collect();
        crate::error::check_dimensions(&vectors, texts.len(), self.dimension)?;
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

pub struct OpenAiEmbeddingBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    model: Option<String>,
    dimension: Option<usize>,
    timeout: Duration,
}

impl Default for OpenAiEmbeddingBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: None,
            dimension: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiEmbeddingBuilder {
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = value.into();
        self
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(value.into()));
        self
    }

    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.model = Some(value.into());
        self
    }

    pub fn dimension(mut self, value: usize) -> Self {
        self.dimension = Some(value);
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn base_url_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.base_url = value;
        }
        self
    }

    pub fn api_key_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.api_key = Some(SecretString::new(value));
        }
        self
    }

    pub fn build(self) -> Result<OpenAiEmbedding, EmbeddingProviderError> {
        let api_key = self
            .api_key
            .ok_or_else(|| EmbeddingProviderError::Config("api_key is required".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| EmbeddingProviderError::Config("model is required".to_string()))?;
        let dimension = self
            .dimension
            .ok_or_else(|| EmbeddingProviderError::Config("dimension is required".to_string()))?;
        if dimension == 0 {
            return Err(EmbeddingProviderError::Config(
                "dimension must be greater than 0".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| EmbeddingProviderError::Config(err.to_string()))?;

        Ok(OpenAiEmbedding {
            base_url: self.base_url,
            api_key,
            model,
            dimension,
            http,
        })
    }
}
