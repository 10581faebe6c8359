use std::sync::Arc;

use async_trait::async_trait;
use papersmith_core::{
    DocumentStore, InMemoryBlobStore, InMemoryRecordStore, Llm, LlmRequest, LlmResponse,
    OcrError, PapersmithError, SourceDocument, Subject, TextExtractor,
};
use papersmith_pipeline::{IndexState, Pipeline, PipelineConfig, PipelineError, SearchRequest};
use papersmith_retrieval::{HashEmbedder, InMemoryVectorStore};

const FACULTY: &str = "faculty-1";

struct UnusedExtractor;

#[async_trait]
impl TextExtractor for UnusedExtractor {
    async fn extract(&self, _content: &[u8], _file_type: &str) -> Result<String, OcrError> {
        Err(OcrError::Provider("not used".to_string()))
    }
}

struct UnusedLlm;

#[async_trait]
impl Llm for UnusedLlm {
    async fn invoke(&self, _request: LlmRequest) -> Result<LlmResponse, PapersmithError> {
        Err(PapersmithError::LlmProvider("not used".to_string()))
    }
}

async fn setup() -> (Pipeline, Arc<InMemoryRecordStore>, Subject) {
    let records = Arc::new(InMemoryRecordStore::new());
    let pipeline = Pipeline::builder()
        .config(PipelineConfig::default())
        .records(records.clone())
        .blobs(Arc::new(InMemoryBlobStore::new()))
        .extractor(Arc::new(UnusedExtractor))
        .embedder(Arc::new(HashEmbedder::default()))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .llm(Arc::new(UnusedLlm))
        .build()
        .unwrap();
    let subject = pipeline
        .catalog
        .add_subject("Biology", "BIO101", None)
        .await
        .unwrap();
    (pipeline, records, subject)
}

async fn insert_text(
    records: &InMemoryRecordStore,
    subject: &Subject,
    unit: u32,
    text: &str,
) -> SourceDocument {
    let document = SourceDocument::new(FACULTY, subject.id.clone(), unit).with_extracted_text(text);
    records.insert_document(&document).await.unwrap();
    document
}

#[tokio::test]
async fn documents_without_text_are_not_indexed() {
    let (pipeline, records, subject) = setup().await;
    let document = SourceDocument::new(FACULTY, subject.id.clone(), 1);
    records.insert_document(&document).await.unwrap();

    let result = pipeline.ingest.index_document(&document.id, FACULTY).await;
    assert!(matches!(result, Err(PipelineError::Conflict(_))));

    let status = pipeline.ingest.index_status(&document.id, FACULTY).await.unwrap();
    assert_eq!(status.state, IndexState::Pending);
    assert_eq!(status.chunk_count, 0);
}

#[tokio::test]
async fn indexed_text_is_searchable_by_subject() {
    let (pipeline, records, subject) = setup().await;
    let leaves = insert_text(
        &records,
        &subject,
        1,
        "Photosynthesis happens in leaves. Photosynthesis needs light.",
    )
    .await;
    let cells = insert_text(&records, &subject, 2, "Mitochondria produce energy for the cell.").await;

    assert_eq!(pipeline.ingest.index_document(&leaves.id, FACULTY).await.unwrap(), 1);
    assert_eq!(pipeline.ingest.index_document(&cells.id, FACULTY).await.unwrap(), 1);

    let results = pipeline
        .ingest
        .search(SearchRequest {
            threshold: Some(0.3),
            ..SearchRequest::new("photosynthesis").subject(subject.id.clone())
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let hit = &results[0];
    assert_eq!(hit.chunk.document_id, leaves.id);
    assert_eq!(hit.chunk.metadata.unit_number, 1);
    assert!(hit.similarity >= 0.3 && hit.similarity <= 1.0);
    assert!(hit.chunk.embedding.is_none());

    let elsewhere = pipeline
        .ingest
        .search(SearchRequest::new("photosynthesis").subject("other-subject"))
        .await
        .unwrap();
    assert!(elsewhere.is_empty());
}

#[tokio::test]
async fn unit_filter_narrows_search() {
    let (pipeline, records, subject) = setup().await;
    let leaves = insert_text(&records, &subject, 1, "Photosynthesis needs light.").await;
    pipeline.ingest.index_document(&leaves.id, FACULTY).await.unwrap();

    let request = SearchRequest {
        units: vec![2, 3],
        ..SearchRequest::new("photosynthesis light").subject(subject.id.clone())
    };
    assert!(pipeline.ingest.search(request).await.unwrap().is_empty());

    let request = SearchRequest {
        units: vec![1],
        ..SearchRequest::new("photosynthesis light").subject(subject.id.clone())
    };
    assert_eq!(pipeline.ingest.search(request).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reindexing_replaces_previous_chunks() {
    let (pipeline, records, subject) = setup().await;
    let document = insert_text(&records, &subject, 1, &"Photosynthesis needs light. ".repeat(80)).await;

    let first = pipeline.ingest.index_document(&document.id, FACULTY).await.unwrap();
    assert!(first > 1);
    let second = pipeline.ingest.index_document(&document.id, FACULTY).await.unwrap();
    assert_eq!(first, second);

    let status = pipeline.ingest.index_status(&document.id, FACULTY).await.unwrap();
    assert_eq!(status.state, IndexState::Indexed);
    assert_eq!(status.chunk_count, first);
}

#[tokio::test]
async fn invalid_search_requests_are_rejected() {
    let (pipeline, _records, _subject) = setup().await;

    let blank = pipeline.ingest.search(SearchRequest::new("   ")).await;
    assert!(matches!(blank, Err(PipelineError::Validation(_))));

    let threshold = pipeline
        .ingest
        .search(SearchRequest {
            threshold: Some(1.5),
            ..SearchRequest::new("photosynthesis")
        })
        .await;
    assert!(matches!(threshold, Err(PipelineError::Validation(_))));
}

#[tokio::test]
async fn foreign_documents_are_not_found() {
    let (pipeline, records, subject) = setup().await;
    let document = insert_text(&records, &subject, 1, "Photosynthesis needs light.").await;

    let result = pipeline.ingest.index_document(&document.id, "faculty-2").await;
    assert!(matches!(result, Err(PipelineError::NotFound { .. })));
    let result = pipeline.ingest.index_status("missing", FACULTY).await;
    assert!(matches!(result, Err(PipelineError::NotFound { .. })));
}
