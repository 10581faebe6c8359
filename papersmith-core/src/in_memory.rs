use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    BlobStore, DocumentStore, OcrStatus, Paper, PaperStatus, PaperStore, PaperUpdate,
    SourceDocument, StoreError, Subject, SubjectStore,
};

#[derive(Default)]
struct RecordsInner {
    documents: HashMap<String, SourceDocument>,
    papers: HashMap<String, Paper>,
    subjects: HashMap<String, Subject>,
}

/// Process-local record store for tests and single-process runs.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    inner: Arc<RwLock<RecordsInner>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_id(id: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryRecordStore {
    async fn insert_document(&self, document: &SourceDocument) -> Result<(), StoreError> {
        check_id(&document.id)?;
        let mut inner = self.inner.write().await;
        inner
            .documents
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<SourceDocument>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.documents.get(id).cloned())
    }

    async fn list_documents(
        &self,
        subject_id: &str,
        faculty_id: &str,
    ) -> Result<Vec<SourceDocument>, StoreError> {
        let inner = self.inner.read().await;
        let mut documents: Vec<SourceDocument> = inner
            .documents
            .values()
            .filter(|doc| doc.subject_id == subject_id && doc.faculty_id == faculty_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(documents)
    }

    async fn transition_ocr_status(
        &self,
        id: &str,
        from: &[OcrStatus],
        to: OcrStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let document = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !from.contains(&document.ocr_status) {
            return Ok(false);
        }
        document.ocr_status = to;
        document.updated_at = Utc::now();
        Ok(true)
    }

    async fn complete_ocr(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let document = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        document.extracted_text = Some(text.to_string());
        document.ocr_status = OcrStatus::Completed;
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn fail_ocr(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let document = inner
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        document.ocr_status = OcrStatus::Failed;
        document.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl PaperStore for InMemoryRecordStore {
    async fn insert_paper(&self, paper: &Paper) -> Result<(), StoreError> {
        check_id(&paper.id)?;
        let mut inner = self.inner.write().await;
        inner.papers.insert(paper.id.clone(), paper.clone());
        Ok(())
    }

    async fn get_paper(&self, id: &str) -> Result<Option<Paper>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.papers.get(id).cloned())
    }

    async fn list_papers(&self, faculty_id: &str) -> Result<Vec<Paper>, StoreError> {
        let inner = self.inner.read().await;
        let mut papers: Vec<Paper> = inner
            .papers
            .values()
            .filter(|paper| paper.faculty_id == faculty_id)
            .cloned()
            .collect();
        papers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(papers)
    }

    async fn transition_paper_status(
        &self,
        id: &str,
        from: &[PaperStatus],
        to: PaperStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let paper = inner
            .papers
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !from.contains(&paper.status) {
            return Ok(false);
        }
        paper.status = to;
        paper.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_paper(&self, id: &str, update: PaperUpdate) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let paper = inner
            .papers
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        paper.status = update.status;
        paper.error = update.error;
        if let Some(questions) = update.questions {
            paper.questions = questions;
        }
        paper.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for InMemoryRecordStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        check_id(&subject.id)?;
        let mut inner = self.inner.write().await;
        inner.subjects.insert(subject.id.clone(), subject.clone());
        Ok(())
    }

    async fn get_subject(&self, id: &str) -> Result<Option<Subject>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.subjects.get(id).cloned())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let inner = self.inner.read().await;
        let mut subjects: Vec<Subject> = inner.subjects.values().cloned().collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, content: &[u8]) -> Result<(), StoreError> {
        check_id(path)?;
        self.blobs
            .write()
            .await
            .insert(path.to_string(), content.to_vec());
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}
