use papersmith_core::{cosine_similarity, Embedding};
use papersmith_retrieval::HashEmbedder;

#[tokio::test]
async fn hash_embedder_is_deterministic() {
    let embedder = HashEmbedder::new(64);
    let first = embedder.embed("hello world").await.unwrap();
    let second = embedder.embed("hello world").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn hash_embedder_batch_matches_single() {
    let embedder = HashEmbedder::new(64);
    let batch = embedder
        .embed_batch(&["hello".to_string(), "world".to_string()])
        .await
        .unwrap();
    let single = embedder.embed("world").await.unwrap();
    assert_eq!(batch[1], single);
}

#[tokio::test]
async fn hash_embedder_scores_shared_words() {
    let embedder = HashEmbedder::default();
    assert_eq!(Embedding::dimension(&embedder), 384);

    let text = embedder
        .embed("Photosynthesis converts light into chemical energy.")
        .await
        .unwrap();
    let related = embedder.embed("PHOTOSYNTHESIS").await.unwrap();
    let unrelated = embedder.embed("mitochondria").await.unwrap();

    assert!(cosine_similarity(&text, &related) > 0.4);
    assert_eq!(cosine_similarity(&text, &unrelated), 0.0);
}

#[tokio::test]
async fn hash_embedder_outputs_unit_vectors() {
    let embedder = HashEmbedder::new(32);
    let vector = embedder.embed("a b c d e f").await.unwrap();
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);

    let empty = embedder.embed("  ...  ").await.unwrap();
    assert!(empty.iter().all(|x| *x == 0.0));
}
