use async_trait::async_trait;

use crate::{OcrStatus, Paper, PaperStatus, PaperUpdate, SourceDocument, StoreError, Subject};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_document(&self, document: &SourceDocument) -> Result<(), StoreError>;

    async fn get_document(&self, id: &str) -> Result<Option<SourceDocument>, StoreError>;

    async fn list_documents(
        &self,
        subject_id: &str,
        faculty_id: &str,
    ) -> Result<Vec<SourceDocument>, StoreError>;

    /// Sets the OCR status to `to` only if the current status is one of
    /// `from`. Returns `false` when the document was in another state.
    async fn transition_ocr_status(
        &self,
        id: &str,
        from: &[OcrStatus],
        to: OcrStatus,
    ) -> Result<bool, StoreError>;

    /// Stores the extracted text and marks the document `completed` in one write.
    async fn complete_ocr(&self, id: &str, text: &str) -> Result<(), StoreError>;

    /// Marks the document `failed`, leaving any extracted text untouched.
    async fn fail_ocr(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PaperStore: Send + Sync {
    async fn insert_paper(&self, paper: &Paper) -> Result<(), StoreError>;

    async fn get_paper(&self, id: &str) -> Result<Option<Paper>, StoreError>;

    /// Papers owned by `faculty_id`, newest first.
    async fn list_papers(&self, faculty_id: &str) -> Result<Vec<Paper>, StoreError>;

    async fn transition_paper_status(
        &self,
        id: &str,
        from: &[PaperStatus],
        to: PaperStatus,
    ) -> Result<bool, StoreError>;

    /// Writes status, error and (when present) questions together.
    async fn update_paper(&self, id: &str, update: PaperUpdate) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError>;

    async fn get_subject(&self, id: &str) -> Result<Option<Subject>, StoreError>;

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError>;
}
