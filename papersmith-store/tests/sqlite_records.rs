use papersmith_core::{
    Difficulty, DocumentStore, FillBlankQuestion, GeneratedQuestions, OcrStatus, Paper,
    PaperStatus, PaperStore, PaperUpdate, QuestionConfig, SourceDocument, StoreError, Subject,
    SubjectStore,
};
use papersmith_store::SqliteStore;

async fn store() -> SqliteStore {
    SqliteStore::builder("sqlite::memory:")
        .max_connections(1)
        .build()
        .await
        .expect("sqlite store should build")
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = store().await;
    papersmith_store::migrations::run_migrations(store.pool())
        .await
        .expect("second migration run should succeed");
}

#[tokio::test]
async fn document_round_trip_keeps_fields() {
    let store = store().await;
    let document = SourceDocument::new("fac-1", "bio", 2).with_file(
        "fac-1/1_notes.pdf",
        "notes.pdf",
        "pdf",
    );
    store.insert_document(&document).await.unwrap();

    let loaded = store
        .get_document(&document.id)
        .await
        .unwrap()
        .expect("document should exist");
    assert_eq!(loaded.faculty_id, "fac-1");
    assert_eq!(loaded.unit_number, 2);
    assert_eq!(loaded.file_path.as_deref(), Some("fac-1/1_notes.pdf"));
    assert_eq!(loaded.file_type.as_deref(), Some("pdf"));
    assert_eq!(loaded.ocr_status, OcrStatus::None);
    assert!(loaded.extracted_text.is_none());

    assert!(store.get_document("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn blank_ids_are_rejected() {
    let store = store().await;
    let mut document = SourceDocument::new("fac-1", "bio", 1);
    document.id = "  ".to_string();
    let err = store.insert_document(&document).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidId(_)));
}

#[tokio::test]
async fn ocr_status_compare_and_set() {
    let store = store().await;
    let document = SourceDocument::new("fac-1", "bio", 1);
    store.insert_document(&document).await.unwrap();

    assert!(store
        .transition_ocr_status(&document.id, &OcrStatus::SUBMITTABLE, OcrStatus::Processing)
        .await
        .unwrap());
    assert!(!store
        .transition_ocr_status(&document.id, &OcrStatus::SUBMITTABLE, OcrStatus::Processing)
        .await
        .unwrap());

    let err = store
        .transition_ocr_status("missing", &OcrStatus::SUBMITTABLE, OcrStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn complete_then_fail_keeps_text() {
    let store = store().await;
    let document = SourceDocument::new("fac-1", "bio", 1);
    store.insert_document(&document).await.unwrap();

    store.complete_ocr(&document.id, "chlorophyll").await.unwrap();
    let loaded = store.get_document(&document.id).await.unwrap().unwrap();
    assert_eq!(loaded.ocr_status, OcrStatus::Completed);
    assert_eq!(loaded.text(), Some("chlorophyll"));

    store.fail_ocr(&document.id).await.unwrap();
    let loaded = store.get_document(&document.id).await.unwrap().unwrap();
    assert_eq!(loaded.ocr_status, OcrStatus::Failed);
    assert_eq!(loaded.text(), Some("chlorophyll"));

    assert!(matches!(
        store.complete_ocr("missing", "x").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(matches!(
        store.fail_ocr("missing").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn documents_list_by_owner_and_subject_oldest_first() {
    let store = store().await;
    let first = SourceDocument::new("fac-1", "bio", 1);
    let mut second = SourceDocument::new("fac-1", "bio", 2);
    second.created_at = first.created_at + chrono::Duration::seconds(5);
    let other_owner = SourceDocument::new("fac-2", "bio", 1);
    let other_subject = SourceDocument::new("fac-1", "chem", 1);

    for document in [&second, &first, &other_owner, &other_subject] {
        store.insert_document(document).await.unwrap();
    }

    let listed = store.list_documents("bio", "fac-1").await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
}

#[tokio::test]
async fn paper_round_trip_and_generation_update() {
    let store = store().await;
    let paper = Paper::draft("fac-1", "bio", "Midterm")
        .with_units(vec![1, 3])
        .with_difficulty(Difficulty::Hard)
        .with_question_config(QuestionConfig::new(5, 2, 1, 0))
        .with_custom_instructions("focus on diagrams");
    store.insert_paper(&paper).await.unwrap();

    let loaded = store.get_paper(&paper.id).await.unwrap().unwrap();
    assert_eq!(loaded.units, vec![1, 3]);
    assert_eq!(loaded.difficulty, Difficulty::Hard);
    assert_eq!(loaded.question_config, QuestionConfig::new(5, 2, 1, 0));
    assert_eq!(loaded.status, PaperStatus::Draft);
    assert!(loaded.questions.is_empty());

    assert!(store
        .transition_paper_status(&paper.id, &PaperStatus::GENERATION_READY, PaperStatus::Pending)
        .await
        .unwrap());
    assert!(!store
        .transition_paper_status(&paper.id, &PaperStatus::GENERATION_READY, PaperStatus::Pending)
        .await
        .unwrap());

    let questions = GeneratedQuestions {
        fill_blanks: vec![FillBlankQuestion {
            id: None,
            question: "Plants store energy as ____.".to_string(),
            answer: "glucose".to_string(),
            marks: 1,
            unit: Some(1),
        }],
        ..GeneratedQuestions::default()
    };
    store
        .update_paper(&paper.id, PaperUpdate::generated(questions.clone()))
        .await
        .unwrap();
    let loaded = store.get_paper(&paper.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, PaperStatus::Generated);
    assert_eq!(loaded.questions, questions);

    store
        .update_paper(&paper.id, PaperUpdate::failed("llm unavailable"))
        .await
        .unwrap();
    let loaded = store.get_paper(&paper.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, PaperStatus::Failed);
    assert_eq!(loaded.error.as_deref(), Some("llm unavailable"));
    assert_eq!(loaded.questions, questions);
}

#[tokio::test]
async fn paper_updates_on_missing_records_fail() {
    let store = store().await;
    let err = store
        .update_paper("missing", PaperUpdate::status(PaperStatus::Processing))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store
        .transition_paper_status("missing", &PaperStatus::GENERATION_READY, PaperStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn papers_list_newest_first() {
    let store = store().await;
    let older = Paper::draft("fac-1", "bio", "Quiz 1");
    let mut newer = Paper::draft("fac-1", "bio", "Quiz 2");
    newer.created_at = older.created_at + chrono::Duration::minutes(1);
    let foreign = Paper::draft("fac-2", "bio", "Other");
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
    assert_eq!(titles, vec!["Quiz 2", "Quiz 1"]);
}

#[tokio::test]
async fn subjects_list_by_name() {
    let store = store().await;
    let zoology = Subject::new("Zoology", "ZOO101");
    let botany = Subject::new("Botany", "BOT101").with_description("plants");
    store.insert_subject(&zoology).await.unwrap();
    store.insert_subject(&botany).await.unwrap();

    let names: Vec<String> = store
        .list_subjects()
        .await
        .unwrap()
        .into_iter()
        .map(|subject| subject.name)
        .collect();
    assert_eq!(names, vec!["Botany", "Zoology"]);

    let loaded = store.get_subject(&botany.id).await.unwrap().unwrap();
    assert_eq!(loaded.code, "BOT101");
    assert_eq!(loaded.description.as_deref(), Some("plants"));
}
