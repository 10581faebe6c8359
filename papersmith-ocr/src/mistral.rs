use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{decode_text, FileKind, OcrProviderError};
use papersmith_core::{OcrError, TextExtractor};

pub const MISTRAL_OCR_MODEL: &str = "mistral-ocr-latest";
const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Mistral OCR over base64 data URIs. Plain-text uploads are decoded
/// locally without a request.
#[derive(Clone)]
pub struct MistralOcrClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OcrDocument {
    ImageUrl { image_url: String },
    DocumentUrl { document_url: String },
}

#[derive(Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: OcrDocument,
    include_image_base64: bool,
}

#[derive(Deserialize)]
struct OcrResponse {
    pages: Vec<OcrPage>,
}

#[derive(Deserialize)]
struct OcrPage {
    index: usize,
    #[serde(default)]
    markdown: String,
}

impl MistralOcrClient {
    pub fn builder() -> MistralOcrBuilder {
        MistralOcrBuilder::default()
    }

    async fn recognize(&self, content: &[u8], kind: FileKind) -> Result<String, OcrError> {
        let (document, labelled) = match kind {
            FileKind::PlainText => return Ok(decode_text(content)),
            FileKind::Image { mime } => (
                OcrDocument::ImageUrl {
                    image_url: data_uri(mime, content),
                },
                false,
            ),
            FileKind::Document { mime } => (
                OcrDocument::DocumentUrl {
                    document_url: data_uri(mime, content),
                },
                true,
            ),
        };
        let request = OcrRequest {
            model: &self.model,
            document,
            include_image_base64: false,
        };

        let url = format!("{}/ocr", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|err| self.map_request_error(err))?
            .error_for_status()
            .map_err(|err| OcrProviderError::Request(err.to_string()))?;
        let body: OcrResponse = response
            .json()
            .await
            .map_err(|err| OcrProviderError::InvalidResponse(err.to_string()))?;

        Ok(render_pages(body.pages, labelled))
    }

    fn map_request_error(&self, err: reqwest::Error) -> OcrError {
        if err.is_timeout() {
            OcrError::Timeout(self.timeout)
        } else {
            OcrProviderError::Request(err.to_string()).into()
        }
    }
}

fn data_uri(mime: &str, content: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(content))
}

fn render_pages(mut pages: Vec<OcrPage>, labelled: bool) -> String {
    pages.sort_by_key(|page| page.index);
    let parts: Vec<String> = pages
        .into_iter()
        .map(|page| {
            if labelled {
                format!("--- Page {} ---\n{}", page.index + 1, page.markdown)
            } else {
                page.markdown
            }
        })
        .collect();
    parts.join("\n\n")
}

#[async_trait]
impl TextExtractor for MistralOcrClient {
    async fn extract(&self, content: &[u8], file_type: &str) -> Result<String, OcrError> {
        let kind = FileKind::detect(file_type)?;
        let text = self.recognize(content, kind).await.map_err(|err| {
            tracing::error!(file_type, error = %err, "text extraction failed");
            err
        })?;
        if text.trim().is_empty() {
            return Err(OcrError::EmptyOutput);
        }
        tracing::info!(file_type, chars = text.chars().count(), "extracted text");
        Ok(text)
    }
}

pub struct MistralOcrBuilder {
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    timeout: Duration,
}

impl Default for MistralOcrBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: MISTRAL_OCR_MODEL.to_string(),
            timeout: Duration::from_secs(180),
        }
    }
}

impl MistralOcrBuilder {
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = value.into();
        self
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(value.into()));
        self
    }

    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.model = value.into();
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

    pub fn base_url_from_env(mut self, var_name: &str) -> Self {
        if let Ok(value) = std::env::var(var_name) {
            self.base_url = value;
        }
        self
    }

    pub fn build(self) -> Result<MistralOcrClient, OcrProviderError> {
        let api_key = self
            .api_key
            .ok_or_else(|| OcrProviderError::Config("api_key is required".to_string()))?;
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| OcrProviderError::Config(err.to_string()))?;
        Ok(MistralOcrClient {
            http,
            base_url: self.base_url,
            api_key,
            model: self.model,
            timeout: self.timeout,
        })
    }
}
