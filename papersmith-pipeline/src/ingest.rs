use std::sync::Arc;

use papersmith_core::{ChunkFilter, DocumentStore, RetrievalResult, SourceDocument, VectorStore};
use papersmith_retrieval::{RecursiveCharacterTextSplitter, RetrievalError};
use serde::Serialize;

use crate::{PipelineError, SharedIndexer, SharedRetriever};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Indexed,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexStatus {
    pub document_id: String,
    pub chunk_count: usize,
    pub state: IndexState,
}

/// Free-text search over indexed chunks. Unset limit and threshold fall
/// back to the configured search defaults.
#[derive(Clone, Debug, Default)]
pub struct SearchRequest {
    pub query: String,
    pub subject_id: Option<String>,
    pub units: Vec<u32>,
    pub limit: Option<usize>,
    pub threshold: Option<f32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }
}

/// Chunking, indexing and search over extracted document text.
#[derive(Clone)]
pub struct IngestService {
    pub(crate) documents: Arc<dyn DocumentStore>,
    pub(crate) indexer: Arc<SharedIndexer>,
    pub(crate) retriever: Arc<SharedRetriever>,
    pub(crate) splitter: RecursiveCharacterTextSplitter,
    pub(crate) search_limit: usize,
    pub(crate) search_threshold: f32,
}

impl IngestService {
    /// Chunks and indexes an owned document, replacing any previous chunks.
    /// Documents whose text has not been extracted are refused.
    pub async fn index_document(
        &self,
        document_id: &str,
        faculty_id: &str,
    ) -> Result<usize, PipelineError> {
        let document = self.owned_document(document_id, faculty_id).await?;
        self.index(&document).await
    }

    pub(crate) async fn index(&self, document: &SourceDocument) -> Result<usize, PipelineError> {
        if document.text().is_none() {
            return Err(PipelineError::Conflict(format!(
                "document '{}' has no extracted text (OCR status: {})",
                document.id, document.ocr_status
            )));
        }
        Ok(self.indexer.index_document(&self.splitter, document).await?)
    }

    pub async fn index_status(
        &self,
        document_id: &str,
        faculty_id: &str,
    ) -> Result<IndexStatus, PipelineError> {
        let document = self.owned_document(document_id, faculty_id).await?;
        let chunk_count = self.indexer.store().count_chunks(&document.id).await?;
        let state = if chunk_count > 0 {
            IndexState::Indexed
        } else {
            IndexState::Pending
        };
        Ok(IndexStatus {
            document_id: document.id,
            chunk_count,
            state,
        })
    }

    pub async fn search(
        &self,
        request: SearchRequest,
    ) -> Result<Vec<RetrievalResult>, PipelineError> {
        let limit = request.limit.unwrap_or(self.search_limit);
        let threshold = request.threshold.unwrap_or(self.search_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::Validation(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        let filter = ChunkFilter::scope(request.subject_id.as_deref(), &request.units);
        match self
            .retriever
            .retrieve(&request.query, filter.as_ref(), limit, threshold)
            .await
        {
            Ok(results) => Ok(results),
            Err(RetrievalError::EmptyQuery) => Err(PipelineError::Validation(
                "search query must not be empty".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn owned_document(
        &self,
        document_id: &str,
        faculty_id: &str,
    ) -> Result<SourceDocument, PipelineError> {
        self.documents
            .get_document(document_id)
            .await?
            .filter(|document| document.faculty_id == faculty_id)
            .ok_or_else(|| PipelineError::not_found("document", document_id))
    }
}
