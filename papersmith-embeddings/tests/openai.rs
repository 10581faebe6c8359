use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use papersmith_core::{Embedding, EmbeddingError};
use papersmith_embeddings::{EmbeddingProviderError, OpenAiEmbedding};

fn embedder(base_url: String) -> OpenAiEmbedding {
    OpenAiEmbedding::builder()
        .base_url(base_url)
        .api_key("test-key")
        .model("text-embedding-3-small")
        .dimension(3)
        .build()
        .expect("embedder")
}

#[tokio::test]
async fn openai_embedding_orders_items_by_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0, 0.0]},
                {"index": 0, "embedding": [1.0, 0.0, 0.0]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = embedder(server.uri())
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .expect("embed");
    assert_eq!(out, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
}

#[tokio::test]
async fn openai_embedding_reports_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = embedder(server.uri()).embed("hello").await.unwrap_err();
    assert!(matches!(
        err,
        EmbeddingError::RateLimited { retry_after: Some(d) } if d.as_secs() == 7
    ));
}

#[tokio::test]
async fn openai_embedding_rejects_count_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"index": 0, "embedding": [1.0, 0.0, 0.0]}]
        })))
        .mount(&server)
        .await;

    let err = embedder(server.uri())
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}

#[test]
fn builder_requires_api_key() {
    let err = OpenAiEmbedding::builder()
        .model("m")
        .dimension(3)
        .build()
        .err()
        .expect("missing key");
    assert!(matches!(err, EmbeddingProviderError::Config(_)));
}
