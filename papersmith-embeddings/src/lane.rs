use std::sync::Arc;

use async_trait::async_trait;
use papersmith_core::{Embedding, EmbeddingError};

use crate::EmbeddingProviderError;

/// A synchronous, compute-bound embedding model (e.g. a local sentence
/// transformer).
pub trait LocalEmbeddingModel: Send + Sync + 'static {
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingProviderError>;

    fn dimension(&self) -> usize;
}

/// Runs a [`LocalEmbeddingModel`] on tokio's blocking pool so inference
/// never occupies an async worker thread.
pub struct BlockingEmbedding<M> {
    model: Arc<M>,
}

impl<M> Clone for BlockingEmbedding<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
        }
    }
}

impl<M: LocalEmbeddingModel> BlockingEmbedding<M> {
    pub fn new(model: M) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

#[async_trait]
impl<M: LocalEmbeddingModel> Embedding for BlockingEmbedding<M> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            EmbeddingError::InvalidResponse("model returned no embedding".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model.clone();
        let texts = texts.to_vec();
        let expected = texts.len();
        let dimension = model.dimension();

        let vectors = tokio::task::spawn_blocking(move || model.embed_texts(&texts))
            .await
            .map_err(|err| EmbeddingError::Other(Box::new(err)))??;

        crate::error::check_dimensions(&vectors, expected, dimension)?;
        tracing::debug!(batch = expected, dimension, "embedded batch on blocking lane");
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }
}
