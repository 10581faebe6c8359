mod error;
mod lane;

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "ollama")]
mod ollama;

pub use error::EmbeddingProviderError;
pub use lane::{BlockingEmbedding, LocalEmbeddingModel};

#[cfg(feature = "openai")]
pub use openai::{OpenAiEmbedding, OpenAiEmbeddingBuilder};

#[cfg(feature = "ollama")]
pub use ollama::OllamaEmbedding;
