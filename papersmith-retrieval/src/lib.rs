mod context;
mod error;
mod hash_embedder;
mod in_memory;
mod indexer;
mod retriever;
mod splitter;

pub use context::{ContextAssembler, DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_MIN_TRUNCATED_CHARS};
pub use error::RetrievalError;
pub use hash_embedder::HashEmbedder;
pub use in_memory::InMemoryVectorStore;
pub use indexer::Indexer;
pub use retriever::SimilarityRetriever;
pub use splitter::{
    RecursiveCharacterTextSplitter, RecursiveCharacterTextSplitterBuilder, SplitterConfigError,
    DEFAULT_SEPARATORS,
};
