use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "papersmith",
    version,
    about = "Generate examination papers from uploaded reference material"
)]
pub struct Cli {
    /// SQLite database holding documents, chunks, papers and subjects
    #[arg(
        long,
        global = true,
        env = "PAPERSMITH_DATABASE_URL",
        default_value = "sqlite://papersmith.db?mode=rwc"
    )]
    pub database_url: String,

    /// Directory uploaded files are stored under
    #[arg(long, global = true, env = "PAPERSMITH_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Owner of uploaded documents and papers
    #[arg(long, global = true, env = "PAPERSMITH_FACULTY_ID", default_value = "local")]
    pub faculty: String,

    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    /// Completion model; the provider default when unset
    #[arg(long, global = true, env = "PAPERSMITH_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct EmbeddingArgs {
    /// Embedding backend used for indexing and queries
    #[arg(
        long = "embedder",
        global = true,
        env = "PAPERSMITH_EMBEDDER",
        value_enum,
        default_value_t = EmbedderKind::Hash
    )]
    pub kind: EmbedderKind,

    /// Embedding model name (openai and ollama backends)
    #[arg(
        long = "embedding-model",
        global = true,
        env = "PAPERSMITH_EMBEDDING_MODEL",
        default_value = "text-embedding-3-small"
    )]
    pub model: String,

    /// Vector width produced by the embedding model
    #[arg(
        long = "embedding-dimension",
        global = true,
        env = "PAPERSMITH_EMBEDDING_DIMENSION",
        default_value_t = 384
    )]
    pub dimension: usize,

    /// Ollama server address
    #[arg(
        long = "ollama-url",
        global = true,
        env = "OLLAMA_BASE_URL",
        default_value = "http://localhost:11434"
    )]
    pub ollama_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// OpenAI-compatible embeddings API (OPENAI_API_KEY, OPENAI_BASE_URL)
    Openai,
    Ollama,
    /// Offline bag-of-words hashing
    Hash,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage subjects
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Upload a reference document for a subject unit
    Upload {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        unit: u32,
        file: PathBuf,
        /// Run text extraction right after the upload
        #[arg(long)]
        process: bool,
    },
    /// List uploaded documents of a subject
    Documents {
        #[arg(long)]
        subject: String,
    },
    /// Extract text from an uploaded document and wait for the result
    Process { document: String },
    /// Chunk and index a document's extracted text
    Index { document: String },
    /// Show how many chunks a document has in the index
    IndexStatus { document: String },
    /// Semantic search over indexed chunks
    Search {
        query: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long = "unit")]
        units: Vec<u32>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Manage paper drafts
    #[command(subcommand)]
    Paper(PaperCommand),
    /// Generate questions for a paper and wait until the job finishes
    Generate {
        paper: String,
        /// Status polling interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        poll_ms: u64,
    },
    /// Show the generation status of a paper
    Status { paper: String },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommand {
    Add {
        name: String,
        code: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
}

#[derive(Subcommand, Debug)]
pub enum PaperCommand {
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        title: String,
        #[arg(long = "unit", required = true)]
        units: Vec<u32>,
        #[arg(long, default_value = "medium")]
        difficulty: String,
        #[arg(long, default_value_t = 0)]
        mcq: u32,
        #[arg(long, default_value_t = 0)]
        fill_blanks: u32,
        #[arg(long, default_value_t = 0)]
        short: u32,
        #[arg(long, default_value_t = 0)]
        long: u32,
        #[arg(long)]
        instructions: Option<String>,
    },
    List,
    /// Print a paper with its generated questions as JSON
    Show { paper: String },
}
