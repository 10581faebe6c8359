use papersmith_core::SourceDocument;
use papersmith_retrieval::{RecursiveCharacterTextSplitter, SplitterConfigError};

fn splitter(size: usize, overlap: usize) -> RecursiveCharacterTextSplitter {
    RecursiveCharacterTextSplitter::builder()
        .chunk_size(size)
        .chunk_overlap(overlap)
        .build()
        .unwrap()
}

#[test]
fn recursive_splitter_respects_separator_priority() {
    let text = "aa aa\n\nbb bb\n\ncc cc";
    let chunks = splitter(8, 0).split_text(text);

    assert_eq!(chunks, vec!["aa aa\n\n", "bb bb\n\n", "cc cc"]);
    assert_eq!(chunks.concat(), text);
}

#[test]
fn recursive_splitter_prefers_sentence_boundaries_over_spaces() {
    let chunks = splitter(25, 0).split_text("First sentence here. Second sentence here. Third one.");
    assert_eq!(
        chunks,
        vec!["First sentence here. ", "Second sentence here. ", "Third one."]
    );
}

#[test]
fn recursive_splitter_preserves_utf8_boundaries() {
    let text = "a🙂b🙂c🙂";
    let chunks = splitter(3, 0).split_text(text);

    assert_eq!(chunks.concat(), text);
    assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 3));
}

#[test]
fn recursive_splitter_applies_overlap_windows() {
    let chunks = splitter(4, 1).split_text("abcdefghij");
    assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
}

#[test]
fn recursive_splitter_overlap_rounds_to_word_boundaries() {
    let chunks = splitter(20, 8).split_text("alpha beta gamma delta epsilon zeta eta theta");
    assert_eq!(
        chunks,
        vec![
            "alpha beta gamma ",
            "gamma delta epsilon ",
            "epsilon zeta eta ",
            "eta theta"
        ]
    );
    for pair in chunks.windows(2) {
        let shared = (1..=pair[0].len())
            .filter(|n| pair[0].is_char_boundary(pair[0].len() - n))
            .any(|n| pair[1].starts_with(&pair[0][pair[0].len() - n..]));
        assert!(shared, "{:?} and {:?} share no overlap", pair[0], pair[1]);
    }
}

#[test]
fn recursive_splitter_rejects_zero_chunk_size() {
    let error = RecursiveCharacterTextSplitter::builder()
        .chunk_size(0)
        .build()
        .unwrap_err();

    assert!(matches!(
        error,
        SplitterConfigError::ChunkSizeMustBeGreaterThanZero
    ));
}

#[test]
fn recursive_splitter_clamps_overlap_to_allow_progress() {
    let chunks = splitter(3, 9).split_text("abcd");
    assert_eq!(chunks, vec!["abc", "bcd"]);
}

#[test]
fn recursive_splitter_is_deterministic() {
    let text = "Cells are the basic unit of life.\n\nMitochondria produce ATP. \
                Ribosomes build proteins.\nThe nucleus stores DNA.";
    let splitter = splitter(30, 10);
    assert_eq!(splitter.split_text(text), splitter.split_text(text));
}

#[test]
fn recursive_splitter_never_exceeds_chunk_size() {
    let text = "Photosynthesis converts light into chemical energy. ".repeat(40);
    for (size, overlap) in [(10, 0), (50, 10), (120, 30), (1000, 200)] {
        let chunks = splitter(size, overlap).split_text(&text);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= size));
    }
}

#[test]
fn split_document_inherits_metadata_with_contiguous_indices() {
    let document = SourceDocument::new("faculty-1", "biology", 2)
        .with_file("faculty-1/1_notes.txt", "notes.txt", "txt")
        .with_extracted_text("one two three");

    let chunks = splitter(5, 0).split_document(&document);

    assert_eq!(chunks.len(), 3);
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, index);
        assert_eq!(chunk.id, format!("{}:{index}", document.id));
        assert_eq!(chunk.document_id, document.id);
        assert_eq!(chunk.metadata.subject_id, "biology");
        assert_eq!(chunk.metadata.unit_number, 2);
        assert_eq!(chunk.metadata.file_name.as_deref(), Some("notes.txt"));
        assert!(chunk.embedding.is_none());
    }
}

#[test]
fn split_document_without_text_yields_nothing() {
    let document = SourceDocument::new("faculty-1", "biology", 1).with_extracted_text("   \n ");
    assert!(splitter(100, 10).split_document(&document).is_empty());
}
