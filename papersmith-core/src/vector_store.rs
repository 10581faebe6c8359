use std::sync::Arc;

use async_trait::async_trait;

use crate::{Chunk, ChunkFilter, StoreError};

/// A chunk returned for a query, with similarity in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replaces every chunk of `document_id` with `chunks` in one step.
    async fn replace_document(&self, document_id: &str, chunks: Vec<Chunk>)
        -> Result<(), StoreError>;

    /// Returns at most `limit` chunks with similarity `>= threshold`,
    /// ordered by descending similarity.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        threshold: f32,
        filter: Option<&ChunkFilter>,
    ) -> Result<Vec<RetrievalResult>, StoreError>;

    async fn count_chunks(&self, document_id: &str) -> Result<usize, StoreError>;
}

#[async_trait]
impl<T> VectorStore for Arc<T>
where
    T: VectorStore + ?Sized,
{
    async fn replace_document(
        &self,
        document_id: &str,
        chunks: Vec<Chunk>,
    ) -> Result<(), StoreError> {
        (**self).replace_document(document_id, chunks).await
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        threshold: f32,
        filter: Option<&ChunkFilter>,
    ) -> Result<Vec<RetrievalResult>, StoreError> {
        (**self)
            .search(query_embedding, limit, threshold, filter)
            .await
    }

    async fn count_chunks(&self, document_id: &str) -> Result<usize, StoreError> {
        (**self).count_chunks(document_id).await
    }
}

/// Cosine similarity clamped to `[0, 1]`. Zero vectors and NaN inputs score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}
