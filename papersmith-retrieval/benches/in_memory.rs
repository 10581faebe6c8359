use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use papersmith_core::SourceDocument;
use papersmith_retrieval::{
    HashEmbedder, InMemoryVectorStore, Indexer, RecursiveCharacterTextSplitter,
    SimilarityRetriever,
};

fn bench_index_and_query(c: &mut Criterion) {
    let embedder = Arc::new(HashEmbedder::default());
    let splitter = RecursiveCharacterTextSplitter::builder()
        .chunk_size(200)
        .chunk_overlap(40)
        .build()
        .unwrap();
    let docs: Vec<SourceDocument> = (0..200)
        .map(|idx| {
            SourceDocument::new("faculty", "biology", (idx % 5) as u32 + 1).with_extracted_text(
                format!("Unit notes {idx}. Photosynthesis and respiration in plant cells. ")
                    .repeat(8),
            )
        })
        .collect();

    let index_runtime = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("index_200_documents", |b| {
        b.iter_batched(
            || Indexer::new(embedder.clone(), Arc::new(InMemoryVectorStore::new())),
            |indexer| {
                index_runtime.block_on(async {
                    for doc in &docs {
                        let _ = indexer.index_document(&splitter, doc).await;
                    }
                })
            },
            BatchSize::SmallInput,
        )
    });

    let store = Arc::new(InMemoryVectorStore::new());
    let indexer = Indexer::new(embedder.clone(), store.clone());
    index_runtime.block_on(async {
        for doc in &docs {
            let _ = indexer.index_document(&splitter, doc).await;
        }
    });

    let retriever = SimilarityRetriever::new(embedder.clone(), store);
    let query_runtime = tokio::runtime::Runtime::new().unwrap();
    c.bench_function("query_top20", |b| {
        b.iter(|| query_runtime.block_on(retriever.retrieve("photosynthesis", None, 20, 0.3)))
    });
}

criterion_group!(benches, bench_index_and_query);
criterion_main!(benches);
