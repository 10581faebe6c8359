use std::sync::Arc;
use std::time::Duration;

use papersmith_core::output_parsers::parse_json_object;
use papersmith_core::{
    FillBlankQuestion, Llm, LongQuestion, McqQuestion, PapersmithError, QuestionKind,
    ShortQuestion, Validate,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use super::prompt::{completion_request, PromptContext};

/// Runs one completion per question type and keeps only well-formed items.
#[derive(Clone)]
pub struct QuestionGenerator {
    llm: Arc<dyn Llm>,
    model: String,
    timeout: Duration,
}

impl QuestionGenerator {
    pub fn new(llm: Arc<dyn Llm>, timeout: Duration) -> Self {
        Self {
            llm,
            model: String::new(),
            timeout,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub async fn mcqs(
        &self,
        prompt: &PromptContext,
        count: u32,
    ) -> Result<Vec<McqQuestion>, PapersmithError> {
        self.generate(QuestionKind::MultipleChoice, prompt, count)
            .await
    }

    pub async fn fill_blanks(
        &self,
        prompt: &PromptContext,
        count: u32,
    ) -> Result<Vec<FillBlankQuestion>, PapersmithError> {
        self.generate(QuestionKind::FillBlank, prompt, count).await
    }

    pub async fn short(
        &self,
        prompt: &PromptContext,
        count: u32,
    ) -> Result<Vec<ShortQuestion>, PapersmithError> {
        self.generate(QuestionKind::Short, prompt, count).await
    }

    pub async fn long(
        &self,
        prompt: &PromptContext,
        count: u32,
    ) -> Result<Vec<LongQuestion>, PapersmithError> {
        self.generate(QuestionKind::Long, prompt, count).await
    }

    /// A zero count returns immediately without a completion call.
    async fn generate<Q>(
        &self,
        kind: QuestionKind,
        prompt: &PromptContext,
        count: u32,
    ) -> Result<Vec<Q>, PapersmithError>
    where
        Q: DeserializeOwned + Validate,
    {
        if count == 0 {
            return Ok(Vec::new());
        }

        let request = completion_request(kind, prompt, count, &self.model);
        let span = tracing::info_span!("generate_questions", kind = %kind, count);
        async move {
            let response = tokio::time::timeout(self.timeout, self.llm.invoke(request))
                .await
                .map_err(|_| PapersmithError::Timeout(self.timeout))??;
            let parsed = parse_json_object(&response.content)?;
            let mut questions: Vec<Q> = collect_valid(kind, &parsed);
            questions.truncate(count as usize);
            tracing::info!(kept = questions.len(), "generated questions");
            Ok::<_, PapersmithError>(questions)
        }
        .instrument(span)
        .await
    }
}

/// Items under `kind`'s key that deserialize and validate. Malformed items
/// are dropped rather than repaired; a missing key yields nothing.
fn collect_valid<Q>(kind: QuestionKind, parsed: &Value) -> Vec<Q>
where
    Q: DeserializeOwned + Validate,
{
    let Some(items) = parsed.get(kind.key()).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<Q>(item.clone()) {
            Ok(question) => match question.validate() {
                Ok(()) => kept.push(question),
                Err(reason) => {
                    tracing::debug!(kind = %kind, %reason, "discarded invalid question")
                }
            },
            Err(err) => {
                tracing::debug!(kind = %kind, error = %err, "discarded malformed question")
            }
        }
    }
    kept
}
