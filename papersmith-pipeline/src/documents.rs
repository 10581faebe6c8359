use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use papersmith_core::{
    owner_scoped_path, BlobStore, DocumentStore, OcrError, OcrStatus, SourceDocument,
    SubjectStore, TextExtractor,
};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::ingest::IngestService;
use crate::PipelineError;

/// An uploaded file and where it belongs.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub faculty_id: String,
    pub subject_id: String,
    pub unit_number: u32,
    pub file_name: String,
    pub file_type: String,
    pub content: Vec<u8>,
}

/// Uploads documents and tracks their text extraction.
///
/// OCR runs `none → processing → completed | failed`. A request is accepted
/// only from `none` or `failed`, so one document never has two extractions
/// racing on its final status. Extracted text and `completed` are written
/// together.
#[derive(Clone)]
pub struct DocumentProcessor {
    pub(crate) documents: Arc<dyn DocumentStore>,
    pub(crate) subjects: Arc<dyn SubjectStore>,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) extractor: Arc<dyn TextExtractor>,
    pub(crate) ingest: Option<IngestService>,
    pub(crate) ocr_timeout: Duration,
}

impl DocumentProcessor {
    /// Stores the file under the owner's path prefix and records the
    /// document with OCR status `none`.
    pub async fn upload(&self, request: UploadRequest) -> Result<SourceDocument, PipelineError> {
        if request.content.is_empty() {
            return Err(PipelineError::Validation("uploaded file is empty".to_string()));
        }
        if request.unit_number == 0 {
            return Err(PipelineError::Validation(
                "unit numbers start at 1".to_string(),
            ));
        }
        if self.subjects.get_subject(&request.subject_id).await?.is_none() {
            return Err(PipelineError::not_found("subject", request.subject_id));
        }

        let file_type = request
            .file_type
            .trim()
            .trim_start_matches('.')
            .to_ascii_lowercase();
        let path = owner_scoped_path(
            &request.faculty_id,
            &request.file_name,
            Utc::now().timestamp(),
        );
        self.blobs.upload(&path, &request.content).await?;

        let document = SourceDocument::new(
            request.faculty_id,
            request.subject_id,
            request.unit_number,
        )
        .with_file(path, request.file_name, file_type);
        self.documents.insert_document(&document).await?;
        tracing::info!(
            document_id = %document.id,
            bytes = request.content.len(),
            "uploaded document"
        );
        Ok(document)
    }

    pub async fn list(
        &self,
        subject_id: &str,
        faculty_id: &str,
    ) -> Result<Vec<SourceDocument>, PipelineError> {
        Ok(self.documents.list_documents(subject_id, faculty_id).await?)
    }

    pub async fn get(
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

    /// Moves an owned document to `processing` and starts extraction in the
    /// background. Documents already `processing` or `completed` are
    /// rejected with `Conflict` and no extraction is started. The handle
    /// resolves to the final OCR status.
    pub async fn submit(
        &self,
        document_id: &str,
        faculty_id: &str,
    ) -> Result<JoinHandle<OcrStatus>, PipelineError> {
        let document = self.get(document_id, faculty_id).await?;
        if document.file_path.is_none() {
            return Err(PipelineError::Validation(format!(
                "document '{document_id}' has no uploaded file"
            )));
        }

        let accepted = self
            .documents
            .transition_ocr_status(&document.id, &OcrStatus::SUBMITTABLE, OcrStatus::Processing)
            .await?;
        if !accepted {
            let current = self
                .documents
                .get_document(&document.id)
                .await?
                .map(|doc| doc.ocr_status)
                .unwrap_or(document.ocr_status);
            return Err(PipelineError::Conflict(format!(
                "document '{document_id}' is already {current}"
            )));
        }

        let processor = self.clone();
        let span = tracing::info_span!("process_document", document_id = %document.id);
        Ok(tokio::spawn(
            async move { processor.process(document).await }.instrument(span),
        ))
    }

    /// Never leaves the document in `processing`: every failure path ends
    /// in `failed`.
    async fn process(&self, document: SourceDocument) -> OcrStatus {
        let text = match self.extract(&document).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "text extraction failed");
                if let Err(store_err) = self.documents.fail_ocr(&document.id).await {
                    tracing::error!(error = %store_err, "could not record failed extraction");
                }
                return OcrStatus::Failed;
            }
        };

        if let Err(err) = self.documents.complete_ocr(&document.id, &text).await {
            tracing::error!(error = %err, "could not store extracted text");
            if let Err(store_err) = self.documents.fail_ocr(&document.id).await {
                tracing::error!(error = %store_err, "could not record failed extraction");
            }
            return OcrStatus::Failed;
        }
        tracing::info!(chars = text.chars().count(), "text extraction completed");

        if let Some(ingest) = &self.ingest {
            let document = document.with_extracted_text(text);
            match ingest.index(&document).await {
                Ok(chunks) => tracing::info!(chunks, "indexed extracted text"),
                Err(err) => tracing::warn!(error = %err, "indexing after extraction failed"),
            }
        }
        OcrStatus::Completed
    }

    async fn extract(&self, document: &SourceDocument) -> Result<String, PipelineError> {
        let path = document.file_path.as_deref().unwrap_or_default();
        let file_type = document.file_type.as_deref().unwrap_or_default();
        let content = self.blobs.download(path).await?;
        let text = tokio::time::timeout(
            self.ocr_timeout,
            self.extractor.extract(&content, file_type),
        )
        .await
        .map_err(|_| OcrError::Timeout(self.ocr_timeout))??;
        if text.trim().is_empty() {
            return Err(OcrError::EmptyOutput.into());
        }
        Ok(text)
    }
}
