mod blob;
mod chunk_filter;
mod document;
mod embedding;
mod error;
mod in_memory;
mod llm;
mod ocr;
pub mod output_parsers;
mod paper;
mod question;
mod records;
mod vector_store;

pub use blob::{owner_scoped_path, BlobStore};
pub use chunk_filter::ChunkFilter;
pub use document::{Chunk, ChunkMetadata, OcrStatus, SourceDocument};
pub use embedding::Embedding;
pub use error::{
    EmbeddingError, OcrError, PapersmithError, ParseEnumError, QuestionError, StoreError,
};
pub use in_memory::{InMemoryBlobStore, InMemoryRecordStore};
pub use llm::{Llm, LlmRequest, LlmResponse, Message, ResponseFormat, Role};
pub use ocr::TextExtractor;
pub use paper::{Difficulty, Paper, PaperStatus, PaperUpdate, QuestionConfig, Subject};
pub use question::{
    FillBlankQuestion, GeneratedQuestions, LongQuestion, McqQuestion, QuestionKind,
    ShortQuestion, Validate,
};
pub use records::{DocumentStore, PaperStore, SubjectStore};
pub use vector_store::{cosine_similarity, RetrievalResult, VectorStore};

pub type Value = serde_json::Value;
