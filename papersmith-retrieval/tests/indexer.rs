use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use papersmith_core::{
    Embedding, EmbeddingError, SourceDocument, VectorStore,
};
use papersmith_retrieval::{
    HashEmbedder, InMemoryVectorStore, Indexer, RecursiveCharacterTextSplitter, RetrievalError,
};

#[derive(Clone, Default)]
struct CountingEmbedder {
    inner: HashEmbedder,
    batch_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Embedding for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }

    fn dimension(&self) -> usize {
        Embedding::dimension(&self.inner)
    }
}

struct StalledEmbedder;

#[async_trait]
impl Embedding for StalledEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        std::future::pending().await
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        std::future::pending().await
    }

    fn dimension(&self) -> usize {
        4
    }
}

fn splitter(size: usize, overlap: usize) -> RecursiveCharacterTextSplitter {
    RecursiveCharacterTextSplitter::builder()
        .chunk_size(size)
        .chunk_overlap(overlap)
        .build()
        .unwrap()
}

fn document(text: &str) -> SourceDocument {
    SourceDocument::new("faculty-1", "biology", 1).with_extracted_text(text)
}

#[tokio::test]
async fn indexer_embeds_all_chunks_in_one_batch() {
    let embedder = CountingEmbedder::default();
    let calls = embedder.batch_calls.clone();
    let store = InMemoryVectorStore::new();
    let indexer = Indexer::new(embedder, store.clone());

    let doc = document("one two three four five six seven eight nine ten");
    let count = indexer.index_document(&splitter(10, 0), &doc).await.unwrap();

    assert!(count > 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.count_chunks(&doc.id).await.unwrap(), count);
}

#[tokio::test]
async fn indexer_reindex_replaces_previous_chunk_set() {
    let store = InMemoryVectorStore::new();
    let indexer = Indexer::new(HashEmbedder::new(64), store.clone());

    let mut doc = document("alpha beta gamma delta epsilon zeta eta theta iota kappa");
    let first = indexer.index_document(&splitter(12, 0), &doc).await.unwrap();
    assert!(first > 1);

    doc.extracted_text = Some("omega".to_string());
    let second = indexer.index_document(&splitter(12, 0), &doc).await.unwrap();
    assert_eq!(second, 1);
    assert_eq!(store.count_chunks(&doc.id).await.unwrap(), 1);
}

#[tokio::test]
async fn indexer_refuses_documents_without_text() {
    let indexer = Indexer::new(HashEmbedder::new(8), InMemoryVectorStore::new());
    let doc = SourceDocument::new("faculty-1", "biology", 1);

    let error = indexer.index_document(&splitter(10, 0), &doc).await.unwrap_err();
    assert!(matches!(error, RetrievalError::MissingText(id) if id == doc.id));
}

#[tokio::test]
async fn indexer_rejects_empty_id() {
    let indexer = Indexer::new(HashEmbedder::new(8), InMemoryVectorStore::new());
    let error = indexer.index_chunks("   ", Vec::new()).await.unwrap_err();
    assert!(matches!(error, RetrievalError::InvalidId(id) if id.trim().is_empty()));
}

#[tokio::test]
async fn indexer_times_out_stalled_embedding() {
    let store = InMemoryVectorStore::new();
    let indexer = Indexer::new(StalledEmbedder, store.clone())
        .with_embedding_timeout(Duration::from_millis(20));

    let doc = document("some text");
    let error = indexer.index_document(&splitter(100, 0), &doc).await.unwrap_err();
    assert!(matches!(
        error,
        RetrievalError::Embedding(EmbeddingError::Timeout(_))
    ));
    assert_eq!(store.count_chunks(&doc.id).await.unwrap(), 0);
}
