use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use papersmith_core::{GeneratedQuestions, Paper, PaperStatus, PaperStore, PaperUpdate, StoreError};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::error::JobError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// No generation has been requested for the paper.
    Draft,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Snapshot of one paper's generation job.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationJob {
    pub paper_id: String,
    pub state: JobState,
    pub questions: Option<GeneratedQuestions>,
    pub error: Option<JobError>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    fn with_state(paper_id: &str, state: JobState) -> Self {
        Self {
            paper_id: paper_id.to_string(),
            state,
            questions: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn pending(paper_id: &str) -> Self {
        Self::with_state(paper_id, JobState::Pending)
    }

    pub fn processing(paper_id: &str) -> Self {
        Self::with_state(paper_id, JobState::Processing)
    }

    pub fn completed(paper_id: &str, questions: GeneratedQuestions) -> Self {
        Self {
            questions: Some(questions),
            ..Self::with_state(paper_id, JobState::Completed)
        }
    }

    pub fn failed(paper_id: &str, error: JobError) -> Self {
        Self {
            error: Some(error),
            ..Self::with_state(paper_id, JobState::Failed)
        }
    }

    /// Job view reconstructed from the durable paper record.
    pub fn from_paper(paper: &Paper) -> Self {
        let state = match paper.status {
            PaperStatus::Draft => JobState::Draft,
            PaperStatus::Pending => JobState::Pending,
            PaperStatus::Processing => JobState::Processing,
            PaperStatus::Generated => JobState::Completed,
            PaperStatus::Failed => JobState::Failed,
        };
        Self {
            paper_id: paper.id.clone(),
            state,
            questions: (state == JobState::Completed).then(|| paper.questions.clone()),
            error: paper.error.as_deref().map(JobError::new),
            updated_at: paper.updated_at,
        }
    }

    fn paper_update(&self) -> PaperUpdate {
        match self.state {
            JobState::Draft => PaperUpdate::status(PaperStatus::Draft),
            JobState::Pending => PaperUpdate::status(PaperStatus::Pending),
            JobState::Processing => PaperUpdate::status(PaperStatus::Processing),
            JobState::Completed => {
                PaperUpdate::generated(self.questions.clone().unwrap_or_default())
            }
            JobState::Failed => PaperUpdate::failed(
                self.error
                    .as_ref()
                    .map(|error| error.message().to_string())
                    .unwrap_or_else(|| "generation failed".to_string()),
            ),
        }
    }
}

/// Authoritative status of generation jobs.
///
/// Each transition replaces the paper's entry as a whole and is written
/// through to the paper record before `record` returns, so the durable copy
/// is never behind the last completed transition. Reads prefer the entry and
/// fall back to the paper record after a restart or eviction.
pub struct JobStatusStore {
    jobs: DashMap<String, GenerationJob>,
    papers: Arc<dyn PaperStore>,
}

impl JobStatusStore {
    pub fn new(papers: Arc<dyn PaperStore>) -> Self {
        Self {
            jobs: DashMap::new(),
            papers,
        }
    }

    /// Replaces the job entry and persists the transition.
    pub async fn record(&self, job: GenerationJob) -> Result<(), StoreError> {
        let update = job.paper_update();
        let paper_id = job.paper_id.clone();
        self.jobs.insert(paper_id.clone(), job);
        self.papers.update_paper(&paper_id, update).await
    }

    /// Replaces the job entry for a transition that is already durable.
    pub(crate) fn remember(&self, job: GenerationJob) {
        self.jobs.insert(job.paper_id.clone(), job);
    }

    pub fn get(&self, paper_id: &str) -> Option<GenerationJob> {
        self.jobs.get(paper_id).map(|entry| entry.value().clone())
    }

    /// The tracked job for `paper`, or one derived from the record itself.
    pub fn status_of(&self, paper: &Paper) -> GenerationJob {
        self.get(&paper.id)
            .unwrap_or_else(|| GenerationJob::from_paper(paper))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drops finished jobs last updated at least `ttl` ago. Their outcome
    /// stays readable from the paper record.
    pub fn evict_expired(&self, ttl: Duration) -> usize {
        self.evict_expired_at(ttl, Utc::now())
    }

    pub fn evict_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| {
            if !job.state.is_terminal() {
                return true;
            }
            let age = now
                .signed_duration_since(job.updated_at)
                .to_std()
                .unwrap_or_default();
            age < ttl
        });
        before.saturating_sub(self.jobs.len())
    }

    /// Runs `evict_expired` every `interval` until the handle is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, ttl: Duration, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = self.evict_expired(ttl);
                if evicted > 0 {
                    tracing::debug!(evicted, "evicted finished generation jobs");
                }
            }
        })
    }
}
