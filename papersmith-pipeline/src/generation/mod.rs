mod generator;
mod orchestrator;
pub mod prompt;

pub use generator::QuestionGenerator;
pub use orchestrator::{retrieval_query, GenerationOrchestrator, GenerationTicket};
pub use prompt::PromptContext;
