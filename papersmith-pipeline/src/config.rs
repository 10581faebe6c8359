use std::str::FromStr;
use std::time::Duration;

use papersmith_retrieval::{ContextAssembler, RecursiveCharacterTextSplitter};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_SEARCH_THRESHOLD: f32 = 0.5;

/// Tunables shared by ingestion, retrieval and generation.
///
/// Every field can be overridden from a `PAPERSMITH_*` environment variable
/// named after it in upper case, e.g. `PAPERSMITH_CHUNK_SIZE`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_limit: usize,
    pub similarity_threshold: f32,
    pub max_context_chars: usize,
    pub min_truncated_chars: usize,
    pub search_limit: usize,
    pub search_threshold: f32,
    pub ocr_timeout_secs: u64,
    pub embedding_timeout_secs: u64,
    pub completion_timeout_secs: u64,
    pub job_ttl_secs: u64,
    pub max_questions_per_type: u32,
    /// Index documents as soon as their text has been extracted.
    pub auto_index: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_limit: 20,
            similarity_threshold: 0.3,
            max_context_chars: 8000,
            min_truncated_chars: 100,
            search_limit: DEFAULT_SEARCH_LIMIT,
            search_threshold: DEFAULT_SEARCH_THRESHOLD,
            ocr_timeout_secs: 180,
            embedding_timeout_secs: 60,
            completion_timeout_secs: 90,
            job_ttl_secs: 6 * 60 * 60,
            max_questions_per_type: 50,
            auto_index: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        override_from_env("PAPERSMITH_CHUNK_SIZE", &mut self.chunk_size)?;
        override_from_env("PAPERSMITH_CHUNK_OVERLAP", &mut self.chunk_overlap)?;
        override_from_env("PAPERSMITH_RETRIEVAL_LIMIT", &mut self.retrieval_limit)?;
        override_from_env(
            "PAPERSMITH_SIMILARITY_THRESHOLD",
            &mut self.similarity_threshold,
        )?;
        override_from_env("PAPERSMITH_MAX_CONTEXT_CHARS", &mut self.max_context_chars)?;
        override_from_env(
            "PAPERSMITH_MIN_TRUNCATED_CHARS",
            &mut self.min_truncated_chars,
        )?;
        override_from_env("PAPERSMITH_SEARCH_LIMIT", &mut self.search_limit)?;
        override_from_env("PAPERSMITH_SEARCH_THRESHOLD", &mut self.search_threshold)?;
        override_from_env("PAPERSMITH_OCR_TIMEOUT_SECS", &mut self.ocr_timeout_secs)?;
        override_from_env(
            "PAPERSMITH_EMBEDDING_TIMEOUT_SECS",
            &mut self.embedding_timeout_secs,
        )?;
        override_from_env(
            "PAPERSMITH_COMPLETION_TIMEOUT_SECS",
            &mut self.completion_timeout_secs,
        )?;
        override_from_env("PAPERSMITH_JOB_TTL_SECS", &mut self.job_ttl_secs)?;
        override_from_env(
            "PAPERSMITH_MAX_QUESTIONS_PER_TYPE",
            &mut self.max_questions_per_type,
        )?;
        override_from_env("PAPERSMITH_AUTO_INDEX", &mut self.auto_index)?;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("search_threshold", self.search_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.retrieval_limit == 0 || self.search_limit == 0 {
            return Err(ConfigError::Invalid(
                "retrieval and search limits must be greater than 0".to_string(),
            ));
        }
        for (name, value) in [
            ("ocr_timeout_secs", self.ocr_timeout_secs),
            ("embedding_timeout_secs", self.embedding_timeout_secs),
            ("completion_timeout_secs", self.completion_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.job_ttl_secs)
    }

    /// Overlap at or above the chunk size is clamped by the splitter.
    pub fn splitter(&self) -> Result<RecursiveCharacterTextSplitter, ConfigError> {
        RecursiveCharacterTextSplitter::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .build()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn context_assembler(&self) -> ContextAssembler {
        ContextAssembler::new(self.max_context_chars)
            .with_min_truncated_chars(self.min_truncated_chars)
    }
}

fn override_from_env<T: FromStr>(var: &str, target: &mut T) -> Result<(), ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.clone(),
    })?;
    Ok(())
}
