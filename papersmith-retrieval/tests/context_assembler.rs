use papersmith_core::{Chunk, ChunkMetadata, RetrievalResult};
use papersmith_retrieval::ContextAssembler;

fn result(id: usize, content: String, similarity: f32) -> RetrievalResult {
    let metadata = ChunkMetadata {
        subject_id: "bio".to_string(),
        unit_number: (id % 5) as u32 + 1,
        file_name: None,
    };
    RetrievalResult {
        chunk: Chunk::new("doc", id, content, metadata),
        similarity,
    }
}

fn sample(count: usize, size: usize) -> Vec<RetrievalResult> {
    (0..count)
        .map(|i| {
            let content: String = "lorem ipsum é ".chars().cycle().take(size + i * 7).collect();
            result(i, content, ((i * 37) % 11) as f32 / 10.0)
        })
        .collect()
}

#[test]
fn assembled_context_never_exceeds_budget() {
    for max_chars in [0, 1, 50, 101, 150, 500, 2_000, 8_000] {
        for (count, size) in [(0, 0), (1, 10), (3, 120), (10, 400), (25, 900)] {
            let context = ContextAssembler::new(max_chars).assemble(&sample(count, size));
            assert!(
                context.chars().count() <= max_chars,
                "len {} over budget {max_chars}",
                context.chars().count()
            );
        }
    }
}

#[test]
fn higher_similarity_chunk_appears_whole_before_lower() {
    let results = vec![
        result(0, "beta ".repeat(40), 0.4),
        result(1, "alpha ".repeat(40), 0.9),
    ];
    let alpha = format!("[Unit 2] {}", "alpha ".repeat(40));
    let budget = alpha.chars().count() + 300;

    let context = ContextAssembler::new(budget).assemble(&results);

    assert!(context.starts_with(&alpha));
    let beta_start = context.find("[Unit 1]").expect("beta included");
    assert_eq!(beta_start, alpha.len() + 2);
    assert!(context.ends_with("beta "));
}

#[test]
fn truncated_boundary_chunk_fills_budget_exactly() {
    let results = vec![
        result(0, "a".repeat(300), 0.9),
        result(1, "b".repeat(300), 0.8),
    ];
    let context = ContextAssembler::new(500).assemble(&results);

    assert_eq!(context.chars().count(), 500);
    assert!(context.ends_with("..."));
    assert_eq!(context.matches("[Unit").count(), 2);
}

#[test]
fn nothing_after_the_boundary_is_considered() {
    let results = vec![
        result(0, "a".repeat(80), 0.9),
        result(1, "b".repeat(500), 0.8),
        result(2, "c".repeat(5), 0.7),
    ];
    let context = ContextAssembler::new(150).assemble(&results);

    assert!(!context.contains('c'));
    assert!(!context.contains('b'));
}
