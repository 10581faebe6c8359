use papersmith_core::{Chunk, ChunkFilter, ChunkMetadata, StoreError, VectorStore};
use papersmith_store::SqliteStore;

async fn store() -> SqliteStore {
    SqliteStore::builder("sqlite::memory:")
        .max_connections(1)
        .build()
        .await
        .expect("sqlite store should build")
}

fn chunk(document_id: &str, index: usize, subject: &str, unit: u32, embedding: Vec<f32>) -> Chunk {
    let metadata = ChunkMetadata {
        subject_id: subject.to_string(),
        unit_number: unit,
        file_name: Some("notes.pdf".to_string()),
    };
    let mut chunk = Chunk::new(document_id, index, format!("{document_id} part {index}"), metadata);
    chunk.embedding = Some(embedding);
    chunk
}

#[tokio::test]
async fn search_orders_by_similarity_and_strips_embeddings() {
    let store = store().await;
    store
        .replace_document(
            "doc-1",
            vec![
                chunk("doc-1", 0, "bio", 1, vec![1.0, 0.0]),
                chunk("doc-1", 1, "bio", 1, vec![0.6, 0.8]),
                chunk("doc-1", 2, "bio", 1, vec![0.0, 1.0]),
            ],
        )
        .await
        .unwrap();

    let results = store.search(&[1.0, 0.0], 5, 0.5, None).await.unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-1:0", "doc-1:1"]);
    assert!((results[0].similarity - 1.0).abs() < 1e-6);
    assert!((results[1].similarity - 0.6).abs() < 1e-6);
    assert!(results.iter().all(|r| r.chunk.embedding.is_none()));
    assert_eq!(results[0].chunk.metadata.file_name.as_deref(), Some("notes.pdf"));

    let limited = store.search(&[1.0, 0.0], 1, 0.0, None).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn replace_swaps_the_whole_chunk_set() {
    let store = store().await;
    store
        .replace_document(
            "doc-1",
            vec![
                chunk("doc-1", 0, "bio", 1, vec![1.0, 0.0]),
                chunk("doc-1", 1, "bio", 1, vec![1.0, 0.0]),
            ],
        )
        .await
        .unwrap();
    assert_eq!(store.count_chunks("doc-1").await.unwrap(), 2);

    store
        .replace_document("doc-1", vec![chunk("doc-1", 0, "bio", 1, vec![0.0, 1.0])])
        .await
        .unwrap();
    assert_eq!(store.count_chunks("doc-1").await.unwrap(), 1);

    store.replace_document("doc-1", Vec::new()).await.unwrap();
    assert_eq!(store.count_chunks("doc-1").await.unwrap(), 0);
}

#[tokio::test]
async fn filters_scope_by_subject_and_unit() {
    let store = store().await;
    store
        .replace_document(
            "doc-bio",
            vec![
                chunk("doc-bio", 0, "bio", 1, vec![1.0, 0.0]),
                chunk("doc-bio", 1, "bio", 2, vec![1.0, 0.1]),
            ],
        )
        .await
        .unwrap();
    store
        .replace_document("doc-chem", vec![chunk("doc-chem", 0, "chem", 1, vec![1.0, 0.0])])
        .await
        .unwrap();

    let filter = ChunkFilter::scope(Some("bio"), &[2]).unwrap();
    let results = store
        .search(&[1.0, 0.0], 10, 0.0, Some(&filter))
        .await
        .unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-bio:1"]);

    let by_document = ChunkFilter::Document("doc-chem".to_string());
    let results = store
        .search(&[1.0, 0.0], 10, 0.0, Some(&by_document))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.metadata.subject_id, "chem");
}

#[tokio::test]
async fn invalid_chunks_leave_existing_rows_untouched() {
    let store = store().await;
    store
        .replace_document("doc-1", vec![chunk("doc-1", 0, "bio", 1, vec![1.0, 0.0])])
        .await
        .unwrap();

    let mut unembedded = chunk("doc-2", 0, "bio", 1, vec![1.0, 0.0]);
    unembedded.embedding = None;
    let err = store
        .replace_document("doc-2", vec![unembedded])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingEmbedding(_)));

    let err = store
        .replace_document("doc-2", vec![chunk("doc-2", 0, "bio", 1, vec![1.0, 0.0, 0.0])])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DimensionMismatch {
            expected: 2,
            got: 3
        }
    ));

    let err = store
        .replace_document("doc-2", vec![chunk("doc-1", 1, "bio", 1, vec![1.0, 0.0])])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidId(_)));

    let err = store.replace_document(" ", Vec::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidId(_)));

    assert_eq!(store.count_chunks("doc-1").await.unwrap(), 1);
    assert_eq!(store.count_chunks("doc-2").await.unwrap(), 0);
}

#[tokio::test]
async fn query_dimension_must_match_stored_vectors() {
    let store = store().await;
    store
        .replace_document("doc-1", vec![chunk("doc-1", 0, "bio", 1, vec![1.0, 0.0])])
        .await
        .unwrap();

    let err = store.search(&[1.0, 0.0, 0.0], 5, 0.0, None).await.unwrap_err();
    assert!(matches!(err, StoreError::DimensionMismatch { .. }));
}

#[tokio::test]
async fn reindexing_a_document_may_change_dimension_when_alone() {
    let store = store().await;
    store
        .replace_document("doc-1", vec![chunk("doc-1", 0, "bio", 1, vec![1.0, 0.0])])
        .await
        .unwrap();
    store
        .replace_document("doc-1", vec![chunk("doc-1", 0, "bio", 1, vec![1.0, 0.0, 0.0])])
        .await
        .unwrap();

    let results = store.search(&[1.0, 0.0, 0.0], 5, 0.0, None).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn concurrent_replacements_agree_on_one_width() {
    let store = store().await;
    let narrow = store.replace_document("doc-a", vec![chunk("doc-a", 0, "bio", 1, vec![1.0, 0.0])]);
    let wide =
        store.replace_document("doc-b", vec![chunk("doc-b", 0, "bio", 1, vec![1.0, 0.0, 0.0])]);
    let (narrow, wide) = tokio::join!(narrow, wide);

    let outcomes = [narrow, wide];
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, Err(StoreError::DimensionMismatch { .. }))));
    let stored = store.count_chunks("doc-a").await.unwrap()
        + store.count_chunks("doc-b").await.unwrap();
    assert_eq!(stored, 1);
}
