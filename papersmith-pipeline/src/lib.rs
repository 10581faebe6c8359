//! Document ingestion and retrieval-augmented question generation.
//!
//! [`Pipeline`] wires the collaborators (record stores, blob store, text
//! extractor, embedding model, vector store, completion API) into the
//! services that drive a paper from uploaded material to generated
//! questions.

use std::sync::Arc;

use papersmith_core::{
    BlobStore, DocumentStore, Embedding, Llm, PaperStore, SubjectStore, TextExtractor,
    VectorStore,
};
use papersmith_retrieval::{Indexer, SimilarityRetriever};

mod catalog;
mod config;
mod documents;
mod error;
pub mod generation;
mod ingest;
mod jobs;

pub use catalog::{Catalog, DraftRequest};
pub use config::{PipelineConfig, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_THRESHOLD};
pub use documents::{DocumentProcessor, UploadRequest};
pub use error::{ConfigError, JobError, PipelineError};
pub use generation::{GenerationOrchestrator, GenerationTicket, QuestionGenerator};
pub use ingest::{IndexState, IndexStatus, IngestService, SearchRequest};
pub use jobs::{GenerationJob, JobState, JobStatusStore};

pub type SharedIndexer = Indexer<Arc<dyn Embedding>, Arc<dyn VectorStore>>;
pub type SharedRetriever = SimilarityRetriever<Arc<dyn Embedding>, Arc<dyn VectorStore>>;

/// The assembled services.
#[derive(Clone)]
pub struct Pipeline {
    pub catalog: Catalog,
    pub documents: DocumentProcessor,
    pub ingest: IngestService,
    pub generation: GenerationOrchestrator,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn jobs(&self) -> &Arc<JobStatusStore> {
        self.generation.jobs()
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    documents: Option<Arc<dyn DocumentStore>>,
    papers: Option<Arc<dyn PaperStore>>,
    subjects: Option<Arc<dyn SubjectStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    embedder: Option<Arc<dyn Embedding>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    llm: Option<Arc<dyn Llm>>,
    model: Option<String>,
}

impl PipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses one backend for documents, papers and subjects.
    pub fn records<R>(mut self, records: Arc<R>) -> Self
    where
        R: DocumentStore + PaperStore + SubjectStore + 'static,
    {
        self.documents = Some(records.clone());
        self.papers = Some(records.clone());
        self.subjects = Some(records);
        self
    }

    pub fn documents(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(store);
        self
    }

    pub fn papers(mut self, store: Arc<dyn PaperStore>) -> Self {
        self.papers = Some(store);
        self
    }

    pub fn subjects(mut self, store: Arc<dyn SubjectStore>) -> Self {
        self.subjects = Some(store);
        self
    }

    pub fn blobs(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(store);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedding>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Completion model; the client's default when unset.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let config = self.config;
        config.validate()?;
        let documents = required(self.documents, "document store")?;
        let papers = required(self.papers, "paper store")?;
        let subjects = required(self.subjects, "subject store")?;
        let blobs = required(self.blobs, "blob store")?;
        let extractor = required(self.extractor, "text extractor")?;
        let embedder = required(self.embedder, "embedding model")?;
        let vector_store = required(self.vector_store, "vector store")?;
        let llm = required(self.llm, "completion client")?;

        let indexer = Arc::new(
            Indexer::new(embedder.clone(), vector_store.clone())
                .with_embedding_timeout(config.embedding_timeout()),
        );
        let retriever = Arc::new(
            SimilarityRetriever::new(embedder, vector_store)
                .with_embedding_timeout(config.embedding_timeout()),
        );

        let ingest = IngestService {
            documents: documents.clone(),
            indexer,
            retriever: retriever.clone(),
            splitter: config.splitter()?,
            search_limit: config.search_limit,
            search_threshold: config.search_threshold,
        };
        let document_processor = DocumentProcessor {
            documents,
            subjects: subjects.clone(),
            blobs,
            extractor,
            ingest: config.auto_index.then(|| ingest.clone()),
            ocr_timeout: config.ocr_timeout(),
        };

        let mut generator = QuestionGenerator::new(llm, config.completion_timeout());
        if let Some(model) = self.model {
            generator = generator.with_model(model);
        }
        let generation = GenerationOrchestrator {
            papers: papers.clone(),
            subjects: subjects.clone(),
            retriever,
            assembler: config.context_assembler(),
            generator,
            jobs: Arc::new(JobStatusStore::new(papers.clone())),
            retrieval_limit: config.retrieval_limit,
            similarity_threshold: config.similarity_threshold,
            max_questions_per_type: config.max_questions_per_type,
        };
        let catalog = Catalog::new(subjects, papers, config.max_questions_per_type);

        Ok(Pipeline {
            catalog,
            documents: document_processor,
            ingest,
            generation,
            config,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, PipelineError> {
    value.ok_or_else(|| ConfigError::Invalid(format!("{name} is required")).into())
}
