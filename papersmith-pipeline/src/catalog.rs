use std::sync::Arc;

use papersmith_core::{Difficulty, Paper, PaperStore, QuestionConfig, Subject, SubjectStore};

use crate::PipelineError;

/// A paper draft to create; generation is requested separately.
#[derive(Clone, Debug)]
pub struct DraftRequest {
    pub faculty_id: String,
    pub subject_id: String,
    pub title: String,
    pub units: Vec<u32>,
    pub difficulty: Difficulty,
    pub question_config: QuestionConfig,
    pub custom_instructions: Option<String>,
}

/// Subjects and paper drafts.
#[derive(Clone)]
pub struct Catalog {
    subjects: Arc<dyn SubjectStore>,
    papers: Arc<dyn PaperStore>,
    max_questions_per_type: u32,
}

impl Catalog {
    pub fn new(
        subjects: Arc<dyn SubjectStore>,
        papers: Arc<dyn PaperStore>,
        max_questions_per_type: u32,
    ) -> Self {
        Self {
            subjects,
            papers,
            max_questions_per_type,
        }
    }

    pub async fn add_subject(
        &self,
        name: &str,
        code: &str,
        description: Option<&str>,
    ) -> Result<Subject, PipelineError> {
        if name.trim().is_empty() || code.trim().is_empty() {
            return Err(PipelineError::Validation(
                "subject name and code are required".to_string(),
            ));
        }
        let mut subject = Subject::new(name.trim(), code.trim());
        if let Some(description) = description {
            subject = subject.with_description(description);
        }
        self.subjects.insert_subject(&subject).await?;
        tracing::info!(subject_id = %subject.id, name = %subject.name, "added subject");
        Ok(subject)
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, PipelineError> {
        Ok(self.subjects.list_subjects().await?)
    }

    pub async fn subject(&self, subject_id: &str) -> Result<Subject, PipelineError> {
        self.subjects
            .get_subject(subject_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("subject", subject_id))
    }

    /// Persists a `draft` paper. Units are sorted and deduplicated.
    pub async fn create_draft(&self, request: DraftRequest) -> Result<Paper, PipelineError> {
        if request.title.trim().is_empty() {
            return Err(PipelineError::Validation("title is required".to_string()));
        }
        let mut units = request.units;
        units.sort_unstable();
        units.dedup();
        if units.is_empty() || units[0] == 0 {
            return Err(PipelineError::Validation(
                "units must be non-empty and start at 1".to_string(),
            ));
        }
        let config = request.question_config;
        if [config.mcq, config.fill_blanks, config.short, config.long]
            .iter()
            .any(|count| *count > self.max_questions_per_type)
        {
            return Err(PipelineError::Validation(format!(
                "at most {} questions of each type may be requested",
                self.max_questions_per_type
            )));
        }
        self.subject(&request.subject_id).await?;

        let mut paper = Paper::draft(request.faculty_id, request.subject_id, request.title.trim())
            .with_units(units)
            .with_difficulty(request.difficulty)
            .with_question_config(config);
        if let Some(instructions) = request
            .custom_instructions
            .filter(|value| !value.trim().is_empty())
        {
            paper = paper.with_custom_instructions(instructions);
        }
        self.papers.insert_paper(&paper).await?;
        tracing::info!(paper_id = %paper.id, "created paper draft");
        Ok(paper)
    }

    pub async fn list_papers(&self, faculty_id: &str) -> Result<Vec<Paper>, PipelineError> {
        Ok(self.papers.list_papers(faculty_id).await?)
    }

    pub async fn paper(&self, paper_id: &str, faculty_id: &str) -> Result<Paper, PipelineError> {
        self.papers
            .get_paper(paper_id)
            .await?
            .filter(|paper| paper.faculty_id == faculty_id)
            .ok_or_else(|| PipelineError::not_found("paper", paper_id))
    }
}
