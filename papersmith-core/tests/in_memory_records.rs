use papersmith_core::{
    DocumentStore, GeneratedQuestions, InMemoryRecordStore, OcrStatus, Paper, PaperStatus,
    PaperStore, PaperUpdate, SourceDocument, StoreError,
};

#[tokio::test]
async fn ocr_transition_only_moves_from_allowed_states() {
    let store = InMemoryRecordStore::new();
    let document = SourceDocument::new("fac-1", "bio", 1);
    store.insert_document(&document).await.unwrap();

    let moved = store
        .transition_ocr_status(&document.id, &OcrStatus::SUBMITTABLE, OcrStatus::Processing)
        .await
        .unwrap();
    assert!(moved);

    let moved_again = store
        .transition_ocr_status(&document.id, &OcrStatus::SUBMITTABLE, OcrStatus::Processing)
        .await
        .unwrap();
    assert!(!moved_again);
}

#[tokio::test]
async fn complete_ocr_sets_text_and_status_together() {
    let store = InMemoryRecordStore::new();
    let document = SourceDocument::new("fac-1", "bio", 1);
    store.insert_document(&document).await.unwrap();

    store.complete_ocr(&document.id, "extracted").await.unwrap();
    let stored = store.get_document(&document.id).await.unwrap().unwrap();
    assert_eq!(stored.ocr_status, OcrStatus::Completed);
    assert_eq!(stored.text(), Some("extracted"));

    store.fail_ocr(&document.id).await.unwrap();
    let stored = store.get_document(&document.id).await.unwrap().unwrap();
    assert_eq!(stored.ocr_status, OcrStatus::Failed);
    assert_eq!(stored.text(), Some("extracted"));
}

#[tokio::test]
async fn transitions_on_missing_records_report_not_found() {
    let store = InMemoryRecordStore::new();
    let err = store.fail_ocr("missing").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
}

#[tokio::test]
async fn paper_update_keeps_questions_when_absent() {
    let store = InMemoryRecordStore::new();
    let paper = Paper::draft("fac-1", "bio", "Midterm");
    store.insert_paper(&paper).await.unwrap();

    let mut questions = GeneratedQuestions::default();
    questions.fill_blanks.push(papersmith_core::FillBlankQuestion {
        id: None,
        question: "The ___ absorbs light.".into(),
        answer: "chlorophyll".into(),
        marks: 1,
        unit: Some(1),
    });
    store
        .update_paper(&paper.id, PaperUpdate::generated(questions.clone()))
        .await
        .unwrap();
    store
        .update_paper(&paper.id, PaperUpdate::failed("boom"))
        .await
        .unwrap();

    let stored = store.get_paper(&paper.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaperStatus::Failed);
    assert_eq!(stored.error.as_deref(), Some("boom"));
    assert_eq!(stored.questions, questions);
}

#[tokio::test]
async fn papers_are_listed_newest_first() {
    let store = InMemoryRecordStore::new();
    let mut older = Paper::draft("fac-1", "bio", "Older");
    older.created_at = older.created_at - chrono::Duration::hours(1);
    let newer = Paper::draft("fac-1", "bio", "Newer");
    let foreign = Paper::draft("fac-2", "bio", "Other faculty");
    for paper in [&older, &newer, &foreign] {
        store.insert_paper(paper).await.unwrap();
    }

    let titles: Vec<String> = store
        .list_papers("fac-1")
        .await
        .unwrap()
        .into_iter()
        .map(|paper| paper.title)
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}
