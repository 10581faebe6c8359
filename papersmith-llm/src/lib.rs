// OpenAI-compatible client (any provider speaking the chat completions format)
pub mod openai_compatible;

pub mod providers;

pub use papersmith_core::{Llm, LlmRequest, LlmResponse, Message, ResponseFormat, Role};

pub use openai_compatible::{
    ChatCompletionRequest, ChatCompletionResponse, OpenAiCompatibleBuilder,
    OpenAiCompatibleClient,
};
pub use providers::groq::GroqClient;
