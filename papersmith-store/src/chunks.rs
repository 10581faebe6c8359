use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

use papersmith_core::{
    cosine_similarity, Chunk, ChunkFilter, ChunkMetadata, RetrievalResult, StoreError,
    VectorStore,
};

use crate::error::query_error;
use crate::sqlite::{decode_json, encode_json};
use crate::SqliteStore;

struct StoredChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

fn chunk_from_row(row: &SqliteRow) -> Result<StoredChunk, StoreError> {
    let chunk_index: i64 = row.try_get("chunk_index").map_err(query_error)?;
    let unit_number: i64 = row.try_get("unit_number").map_err(query_error)?;
    let embedding: String = row.try_get("embedding").map_err(query_error)?;
    let metadata = ChunkMetadata {
        subject_id: row.try_get("subject_id").map_err(query_error)?,
        unit_number: u32::try_from(unit_number)
            .map_err(|_| StoreError::Internal(format!("invalid unit {unit_number}").into()))?,
        file_name: row.try_get("file_name").map_err(query_error)?,
    };
    let chunk = Chunk {
        id: row.try_get("id").map_err(query_error)?,
        document_id: row.try_get("document_id").map_err(query_error)?,
        chunk_index: usize::try_from(chunk_index)
            .map_err(|_| StoreError::Internal(format!("invalid index {chunk_index}").into()))?,
        content: row.try_get("content").map_err(query_error)?,
        metadata,
        embedding: None,
    };
    Ok(StoredChunk {
        chunk,
        embedding: decode_json("embedding", &embedding)?,
    })
}

/// Embedding width of chunks that belong to documents other than `document_id`.
async fn dimension_excluding(
    conn: &mut SqliteConnection,
    document_id: &str,
) -> Result<Option<usize>, StoreError> {
    let embedding: Option<String> = sqlx::query_scalar(
        "SELECT embedding FROM document_chunks WHERE document_id != ? LIMIT 1",
    )
    .bind(document_id)
    .fetch_optional(conn)
    .await
    .map_err(query_error)?;
    match embedding {
        Some(raw) => {
            let vector: Vec<f32> = decode_json("embedding", &raw)?;
            Ok(Some(vector.len()))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn replace_document(
        &self,
        document_id: &str,
        chunks: Vec<Chunk>,
    ) -> Result<(), StoreError> {
        if document_id.trim().is_empty() {
            return Err(StoreError::InvalidId(document_id.to_string()));
        }

        // Delete first: the write lock is held before the width check.
        let mut tx = self.pool.begin().await.map_err(query_error)?;
        sqlx::query("DELETE FROM document_chunks WHERE document_id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        let mut dimension = dimension_excluding(&mut *tx, document_id).await?;
        let mut rows = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
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
            rows.push((chunk, encode_json("embedding", embedding)?));
        }

        for (chunk, embedding) in rows {
            sqlx::query(
                "INSERT INTO document_chunks (id, document_id, chunk_index, content, \
                 subject_id, unit_number, file_name, embedding) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(chunk.chunk_index as i64)
            .bind(&chunk.content)
            .bind(&chunk.metadata.subject_id)
            .bind(i64::from(chunk.metadata.unit_number))
            .bind(&chunk.metadata.file_name)
            .bind(embedding)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }
        tx.commit().await.map_err(query_error)?;

        tracing::debug!(document_id, chunks = chunks.len(), "replaced document chunks");
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        threshold: f32,
        filter: Option<&ChunkFilter>,
    ) -> Result<Vec<RetrievalResult>, StoreError> {
        let rows = match filter.and_then(ChunkFilter::required_subject) {
            Some(subject_id) => {
                sqlx::query(
                    "SELECT * FROM document_chunks WHERE subject_id = ? \
                     ORDER BY document_id, chunk_index",
                )
                .bind(subject_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM document_chunks ORDER BY document_id, chunk_index")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(query_error)?;

        let mut scored = Vec::new();
        for row in &rows {
            let stored = chunk_from_row(row)?;
            if stored.embedding.len() != query_embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected: stored.embedding.len(),
                    got: query_embedding.len(),
                });
            }
            if let Some(filter) = filter {
                if !filter.matches(&stored.chunk) {
                    continue;
                }
            }
            let similarity = cosine_similarity(query_embedding, &stored.embedding);
            if similarity < threshold {
                continue;
            }
            scored.push(RetrievalResult {
                chunk: stored.chunk,
                similarity,
            });
        }

        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count_chunks(&self, document_id: &str) -> Result<usize, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_chunks WHERE document_id = ?")
                .bind(document_id)
                .fetch_one(&self.pool)
                .await
                .map_err(query_error)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
