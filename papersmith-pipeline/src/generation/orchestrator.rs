use std::sync::Arc;

use papersmith_core::{
    ChunkFilter, GeneratedQuestions, Paper, PaperStatus, PaperStore, PapersmithError,
    QuestionConfig, QuestionKind, SubjectStore,
};
use papersmith_retrieval::ContextAssembler;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::generator::QuestionGenerator;
use super::prompt::PromptContext;
use crate::error::{JobError, PipelineError};
use crate::jobs::{GenerationJob, JobStatusStore};
use crate::SharedRetriever;

/// Accepted generation request. `job` is the `pending` snapshot returned to
/// the caller; `task` resolves to the job's final state.
pub struct GenerationTicket {
    pub job: GenerationJob,
    pub task: JoinHandle<GenerationJob>,
}

struct GenerationPlan {
    paper_id: String,
    subject_id: String,
    config: QuestionConfig,
    prompt: PromptContext,
}

/// Drives one paper from `pending` to `completed` or `failed`: gathers
/// reference content, runs the four question types concurrently and records
/// every transition through the job-status store.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    pub(crate) papers: Arc<dyn PaperStore>,
    pub(crate) subjects: Arc<dyn SubjectStore>,
    pub(crate) retriever: Arc<SharedRetriever>,
    pub(crate) assembler: ContextAssembler,
    pub(crate) generator: QuestionGenerator,
    pub(crate) jobs: Arc<JobStatusStore>,
    pub(crate) retrieval_limit: usize,
    pub(crate) similarity_threshold: f32,
    pub(crate) max_questions_per_type: u32,
}

impl GenerationOrchestrator {
    pub fn jobs(&self) -> &Arc<JobStatusStore> {
        &self.jobs
    }

    /// Validates and accepts a generation request, returning at once with a
    /// `pending` job while the work continues in the background. A paper
    /// whose generation is already pending or running is rejected.
    pub async fn start(
        &self,
        paper_id: &str,
        faculty_id: &str,
    ) -> Result<GenerationTicket, PipelineError> {
        let paper = self.owned_paper(paper_id, faculty_id).await?;
        let subject = self
            .subjects
            .get_subject(&paper.subject_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("subject", &paper.subject_id))?;
        validate_generation(&paper, self.max_questions_per_type)?;

        let accepted = self
            .papers
            .transition_paper_status(
                &paper.id,
                &PaperStatus::GENERATION_READY,
                PaperStatus::Pending,
            )
            .await?;
        if !accepted {
            return Err(PipelineError::Conflict(format!(
                "paper '{}' already has a generation in progress",
                paper.id
            )));
        }

        let job = GenerationJob::pending(&paper.id);
        self.jobs.remember(job.clone());

        let plan = GenerationPlan {
            paper_id: paper.id.clone(),
            subject_id: paper.subject_id.clone(),
            config: paper.question_config,
            prompt: PromptContext {
                subject_name: subject.name,
                units: paper.units.clone(),
                difficulty: paper.difficulty,
                context: String::new(),
                custom_instructions: paper.custom_instructions.clone(),
            },
        };
        let orchestrator = self.clone();
        let span = tracing::info_span!("generate_paper", paper_id = %paper.id);
        let task = tokio::spawn(async move { orchestrator.run(plan).await }.instrument(span));

        tracing::info!(paper_id = %paper.id, "accepted generation request");
        Ok(GenerationTicket { job, task })
    }

    /// Current job state: the tracked entry when present, else the paper record.
    pub async fn status(
        &self,
        paper_id: &str,
        faculty_id: &str,
    ) -> Result<GenerationJob, PipelineError> {
        let paper = self.owned_paper(paper_id, faculty_id).await?;
        Ok(self.jobs.status_of(&paper))
    }

    async fn owned_paper(&self, paper_id: &str, faculty_id: &str) -> Result<Paper, PipelineError> {
        self.papers
            .get_paper(paper_id)
            .await?
            .filter(|paper| paper.faculty_id == faculty_id)
            .ok_or_else(|| PipelineError::not_found("paper", paper_id))
    }

    async fn run(&self, plan: GenerationPlan) -> GenerationJob {
        let paper_id = plan.paper_id.clone();
        match self.execute(plan).await {
            Ok(job) => job,
            Err(err) => {
                tracing::error!(error = %err, "generation failed");
                let job = GenerationJob::failed(&paper_id, JobError::from(&err));
                if let Err(store_err) = self.jobs.record(job.clone()).await {
                    tracing::error!(error = %store_err, "could not persist failed generation");
                }
                job
            }
        }
    }

    async fn execute(&self, mut plan: GenerationPlan) -> Result<GenerationJob, PipelineError> {
        self.jobs
            .record(GenerationJob::processing(&plan.paper_id))
            .await?;

        plan.prompt.context = self.gather_context(&plan).await;
        let questions = self.fan_out(&plan).await;
        tracing::info!(
            mcqs = questions.mcqs.len(),
            fill_blanks = questions.fill_blanks.len(),
            short = questions.short.len(),
            long = questions.long.len(),
            "generation finished"
        );

        let job = GenerationJob::completed(&plan.paper_id, questions);
        self.jobs.record(job.clone()).await?;
        Ok(job)
    }

    /// Retrieval problems never fail the job; generation proceeds without
    /// reference content.
    async fn gather_context(&self, plan: &GenerationPlan) -> String {
        let query = retrieval_query(&plan.prompt.subject_name);
        let filter = ChunkFilter::scope(Some(plan.subject_id.as_str()), &plan.prompt.units);
        match self
            .retriever
            .retrieve(
                &query,
                filter.as_ref(),
                self.retrieval_limit,
                self.similarity_threshold,
            )
            .await
        {
            Ok(results) if results.is_empty() => {
                tracing::info!("no reference content matched; generating without context");
                String::new()
            }
            Ok(results) => {
                let context = self.assembler.assemble(&results);
                tracing::info!(
                    chunks = results.len(),
                    chars = context.chars().count(),
                    "assembled reference context"
                );
                context
            }
            Err(err) => {
                tracing::warn!(error = %err, "context retrieval failed; generating without context");
                String::new()
            }
        }
    }

    /// All four types run to completion; a failed type contributes an
    /// empty list.
    async fn fan_out(&self, plan: &GenerationPlan) -> GeneratedQuestions {
        let prompt = &plan.prompt;
        let config = plan.config;
        let (mcqs, fill_blanks, short, long) = tokio::join!(
            self.generator.mcqs(prompt, config.mcq),
            self.generator.fill_blanks(prompt, config.fill_blanks),
            self.generator.short(prompt, config.short),
            self.generator.long(prompt, config.long),
        );
        GeneratedQuestions {
            mcqs: settle(QuestionKind::MultipleChoice, mcqs),
            fill_blanks: settle(QuestionKind::FillBlank, fill_blanks),
            short: settle(QuestionKind::Short, short),
            long: settle(QuestionKind::Long, long),
        }
    }
}

pub fn retrieval_query(subject_name: &str) -> String {
    format!("key concepts definitions important topics from {subject_name}")
}

fn settle<T>(kind: QuestionKind, result: Result<Vec<T>, PapersmithError>) -> Vec<T> {
    match result {
        Ok(questions) => questions,
        Err(err) => {
            tracing::warn!(kind = %kind, error = %err, "question type failed; continuing without it");
            Vec::new()
        }
    }
}

fn validate_generation(paper: &Paper, max_per_type: u32) -> Result<(), PipelineError> {
    if paper.units.is_empty() {
        return Err(PipelineError::Validation(
            "at least one unit must be selected".to_string(),
        ));
    }
    if paper.units.contains(&0) {
        return Err(PipelineError::Validation(
            "unit numbers start at 1".to_string(),
        ));
    }
    let config = paper.question_config;
    for (kind, count) in [
        (QuestionKind::MultipleChoice, config.mcq),
        (QuestionKind::FillBlank, config.fill_blanks),
        (QuestionKind::Short, config.short),
        (QuestionKind::Long, config.long),
    ] {
        if count > max_per_type {
            return Err(PipelineError::Validation(format!(
                "{count} {kind} questions requested, at most {max_per_type} allowed"
            )));
        }
    }
    Ok(())
}
