use std::time::Duration;

use papersmith_core::{Chunk, Embedding, EmbeddingError, SourceDocument, VectorStore};

use crate::{RecursiveCharacterTextSplitter, RetrievalError};

/// Embeds a document's chunks in one batch and replaces its indexed set.
pub struct Indexer<E, S> {
    embedder: E,
    store: S,
    embedding_timeout: Option<Duration>,
}

impl<E, S> Indexer<E, S>
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

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Splits and indexes a document, returning the number of chunks stored.
    /// Documents without extracted text are refused.
    pub async fn index_document(
        &self,
        splitter: &RecursiveCharacterTextSplitter,
        document: &SourceDocument,
    ) -> Result<usize, RetrievalError> {
        if document.text().is_none() {
            return Err(RetrievalError::MissingText(document.id.clone()));
        }
        let chunks = splitter.split_document(document);
        self.index_chunks(&document.id, chunks).await
    }

    /// Embeds `chunks` with a single batch call and makes them the complete
    /// chunk set of `document_id`.
    pub async fn index_chunks(
        &self,
        document_id: &str,
        mut chunks: Vec<Chunk>,
    ) -> Result<usize, RetrievalError> {
        if document_id.trim().is_empty() {
            return Err(RetrievalError::InvalidId(document_id.to_string()));
        }

        if !chunks.is_empty() {
            let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
            let embeddings = self.embed_batch(&texts).await?;
            if embeddings.len() != chunks.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    embeddings.len()
                ))
                .into());
            }
            for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
                chunk.embedding = Some(embedding);
            }
        }

        let count = chunks.len();
        self.store.replace_document(document_id, chunks).await?;
        tracing::info!(document_id = %document_id, chunks = count, "indexed document");
        Ok(count)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self.embedding_timeout {
            Some(limit) => tokio::time::timeout(limit, self.embedder.embed_batch(texts))
                .await
                .map_err(|_| EmbeddingError::Timeout(limit))?,
            None => self.embedder.embed_batch(texts).await,
        }
    }
}
