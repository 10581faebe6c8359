use std::collections::BTreeMap;
use std::sync::Arc;

use papersmith_core::{
    cosine_similarity, Chunk, ChunkFilter, RetrievalResult, StoreError, VectorStore,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreInner {
    documents: BTreeMap<String, Vec<Chunk>>,
    dimension: Option<usize>,
}

/// Exhaustive cosine search over chunks held in memory.
#[derive(Clone, Default)]
pub struct InMemoryVectorStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.documents.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn validate_chunks(
    document_id: &str,
    chunks: &[Chunk],
    mut dimension: Option<usize>,
) -> Result<Option<usize>, StoreError> {
    for chunk in chunks {
        if chunk.document_id != document_id {
            return Err(StoreError::InvalidId(chunk.id.clone()));
        }
        let embedding = chunk
            .embedding
            .as_ref()
            .ok_or_else(|| StoreError::MissingEmbedding(chunk.id.clone()))?;
        match dimension {
            Some(expected) if expected != embedding.len() => {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    got: embedding.len(),
                });
            }
            None => dimension = Some(embedding.len()),
            _ => {}
        }
    }
    Ok(dimension)
}

#[async_trait::async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn replace_document(
        &self,
        document_id: &str,
        chunks: Vec<Chunk>,
    ) -> Result<(), StoreError> {
        if document_id.trim().is_empty() {
            return Err(StoreError::InvalidId(document_id.to_string()));
        }

        let mut inner = self.inner.write().await;
        let others_empty = inner
            .documents
            .iter()
            .all(|(id, existing)| id == document_id || existing.is_empty());
        let current = if others_empty { None } else { inner.dimension };
        let dimension = validate_chunks(document_id, &chunks, current)?;

        if chunks.is_empty() {
            inner.documents.remove(document_id);
        } else {
            inner.documents.insert(document_id.to_string(), chunks);
        }
        inner.dimension = if inner.documents.is_empty() {
            None
        } else {
            dimension
        };
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        threshold: f32,
        filter: Option<&ChunkFilter>,
    ) -> Result<Vec<RetrievalResult>, StoreError> {
        let inner = self.inner.read().await;
        let expected = inner.dimension.unwrap_or(query_embedding.len());
        if expected != query_embedding.len() {
            return Err(StoreError::DimensionMismatch {
                expected,
                got: query_embedding.len(),
            });
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored = Vec::new();
        for chunk in inner.documents.values().flatten() {
            let Some(embedding) = chunk.embedding.as_ref() else {
                continue;
            };
            if let Some(filter) = filter {
                if !filter.matches(chunk) {
                    continue;
                }
            }
            let similarity = cosine_similarity(query_embedding, embedding);
            if similarity < threshold {
                continue;
            }
            let mut result_chunk = chunk.clone();
            result_chunk.embedding = None;
            scored.push(RetrievalResult {
                chunk: result_chunk,
                similarity,
            });
        }

        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count_chunks(&self, document_id: &str) -> Result<usize, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.documents.get(document_id).map_or(0, Vec::len))
    }
}
