use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use papersmith_core::{Embedding, EmbeddingError};
use papersmith_embeddings::{BlockingEmbedding, EmbeddingProviderError, LocalEmbeddingModel};

struct SlowModel {
    delay: Duration,
    calls: AtomicUsize,
}

impl LocalEmbeddingModel for SlowModel {
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}

struct BrokenModel;

impl LocalEmbeddingModel for BrokenModel {
    fn embed_texts(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        Ok(vec![vec![1.0, 2.0, 3.0]])
    }

    fn dimension(&self) -> usize {
        2
    }
}

#[tokio::test]
async fn blocking_model_does_not_stall_the_runtime() {
    let embedder = BlockingEmbedding::new(SlowModel {
        delay: Duration::from_millis(200),
        calls: AtomicUsize::new(0),
    });

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let out = embedder
        .embed_batch(&["abc".to_string(), "de".to_string()])
        .await
        .expect("embed");
    ticker.abort();

    assert_eq!(out, vec![vec![3.0, 1.0], vec![2.0, 1.0]]);
    assert_eq!(embedder.model().calls.load(Ordering::SeqCst), 1);
    assert!(ticks.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn empty_batch_skips_the_model() {
    let embedder = BlockingEmbedding::new(SlowModel {
        delay: Duration::from_millis(0),
        calls: AtomicUsize::new(0),
    });
    let out = embedder.embed_batch(&[]).await.expect("embed");
    assert!(out.is_empty());
    assert_eq!(embedder.model().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn model_output_is_checked_against_dimension() {
    let embedder = BlockingEmbedding::new(BrokenModel);
    let err = embedder.embed("x").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}
