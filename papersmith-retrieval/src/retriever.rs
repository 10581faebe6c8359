use std::time::Duration;

use papersmith_core::{ChunkFilter, Embedding, EmbeddingError, RetrievalResult, VectorStore};
use tracing::Instrument;

use crate::RetrievalError;

pub struct SimilarityRetriever<E, S> {
    embedder: E,
    store: S,
    embedding_timeout: Option<Duration>,
}

impl<E, S> SimilarityRetriever<E, S>
where
    E: Embedding,
    S: VectorStore,
{
    pub fn new(embedder: E, store: S) -> Self {
        Self {
            embedder,
            store,
            embedding_timeout: None,
        }
    }

    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = Some(timeout);
        self
    }

    /// Embeds `query` with the indexing model and returns at most `limit`
    /// chunks scoring at least `threshold`, best first. No match is an empty
    /// result, not an error.
    pub async fn retrieve(
        &self,
        query: &str,
        filter: Option<&ChunkFilter>,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        let span = tracing::info_span!("retrieve", limit, threshold);
        async move {
            let embedding = match self.embedding_timeout {
                Some(timeout) => tokio::time::timeout(timeout, self.embedder.embed(query))
                    .await
                    .map_err(|_| EmbeddingError::Timeout(timeout))??,
                None => self.embedder.embed(query).await?,
            };
            let results = self
                .store
                .search(&embedding, limit, threshold, filter)
                .await?;
            tracing::debug!(results = results.len(), "retrieval finished");
            Ok::<_, RetrievalError>(results)
        }
        .instrument(span)
        .await
    }
}
