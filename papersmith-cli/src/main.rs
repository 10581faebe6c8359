use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use papersmith_core::{Difficulty, Embedding, QuestionConfig, TextExtractor};
use papersmith_embeddings::{BlockingEmbedding, OllamaEmbedding, OpenAiEmbedding};
use papersmith_llm::GroqClient;
use papersmith_ocr::{MistralOcrClient, PlainTextExtractor};
use papersmith_pipeline::{
    DraftRequest, GenerationJob, JobState, Pipeline, PipelineConfig, SearchRequest, UploadRequest,
};
use papersmith_retrieval::HashEmbedder;
use papersmith_store::{FsBlobStore, SqliteStore};

mod args;

use args::{Cli, Command, EmbedderKind, EmbeddingArgs, PaperCommand, SubjectCommand};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env().context("invalid PAPERSMITH_* configuration")?;
    let pipeline = build_pipeline(&cli, config).await?;
    run(&pipeline, &cli.faculty, cli.command).await
}

async fn build_pipeline(cli: &Cli, config: PipelineConfig) -> Result<Pipeline> {
    let records = Arc::new(
        SqliteStore::builder(&cli.database_url)
            .build()
            .await
            .with_context(|| format!("failed to open database {}", cli.database_url))?,
    );
    let embedder = embedder(&cli.embedding, &config)?;
    let extractor: Arc<dyn TextExtractor> = match std::env::var("MISTRAL_API_KEY") {
        Ok(_) => Arc::new(
            MistralOcrClient::builder()
                .api_key_from_env("MISTRAL_API_KEY")
                .base_url_from_env("MISTRAL_BASE_URL")
                .timeout(config.ocr_timeout())
                .build()?,
        ),
        Err(_) => {
            tracing::warn!("MISTRAL_API_KEY is not set; only plain-text documents can be processed");
            Arc::new(PlainTextExtractor)
        }
    };
    let api_key = std::env::var("GROQ_API_KEY").context("GROQ_API_KEY must be set")?;
    let llm = GroqClient::with_timeout(api_key, config.completion_timeout())?;

    let mut builder = Pipeline::builder()
        .config(config)
        .records(records.clone())
        .vector_store(records)
        .blobs(Arc::new(FsBlobStore::new(&cli.data_dir)))
        .extractor(extractor)
        .embedder(embedder)
        .llm(Arc::new(llm));
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    Ok(builder.build()?)
}

fn embedder(args: &EmbeddingArgs, config: &PipelineConfig) -> Result<Arc<dyn Embedding>> {
    let embedder: Arc<dyn Embedding> = match args.kind {
        EmbedderKind::Openai => Arc::new(
            OpenAiEmbedding::builder()
                .api_key_from_env("OPENAI_API_KEY")
                .base_url_from_env("OPENAI_BASE_URL")
                .model(&args.model)
                .dimension(args.dimension)
                .timeout(config.embedding_timeout())
                .build()?,
        ),
        EmbedderKind::Ollama => Arc::new(OllamaEmbedding::new(
            args.ollama_url.clone(),
            args.model.clone(),
            args.dimension,
        )),
        EmbedderKind::Hash => Arc::new(BlockingEmbedding::new(HashEmbedder::new(args.dimension))),
    };
    Ok(embedder)
}

async fn run(pipeline: &Pipeline, faculty: &str, command: Command) -> Result<()> {
    match command {
        Command::Subject(SubjectCommand::Add {
            name,
            code,
            description,
        }) => {
            let subject = pipeline
                .catalog
                .add_subject(&name, &code, description.as_deref())
                .await?;
            println!("{}", subject.id);
        }
        Command::Subject(SubjectCommand::List) => {
            for subject in pipeline.catalog.list_subjects().await? {
                println!("{}\t{}\t{}", subject.id, subject.code, subject.name);
            }
        }
        Command::Upload {
            subject,
            unit,
            file,
            process,
        } => {
            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .context("upload path has no file name")?;
            let file_type = file
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            let document = pipeline
                .documents
                .upload(UploadRequest {
                    faculty_id: faculty.to_string(),
                    subject_id: subject,
                    unit_number: unit,
                    file_name,
                    file_type,
                    content,
                })
                .await?;
            println!("{}", document.id);
            if process {
                process_document(pipeline, faculty, &document.id).await?;
            }
        }
        Command::Documents { subject } => {
            for document in pipeline.documents.list(&subject, faculty).await? {
                println!(
                    "{}\tunit {}\t{}\t{}",
                    document.id,
                    document.unit_number,
                    document.ocr_status,
                    document.file_name.unwrap_or_default()
                );
            }
        }
        Command::Process { document } => process_document(pipeline, faculty, &document).await?,
        Command::Index { document } => {
            let chunks = pipeline.ingest.index_document(&document, faculty).await?;
            println!("indexed {chunks} chunks");
        }
        Command::IndexStatus { document } => {
            let status = pipeline.ingest.index_status(&document, faculty).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Search {
            query,
            subject,
            units,
            limit,
            threshold,
        } => {
            let results = pipeline
                .ingest
                .search(SearchRequest {
                    query,
                    subject_id: subject,
                    units,
                    limit,
                    threshold,
                })
                .await?;
            if results.is_empty() {
                println!("no matching chunks");
            }
            for result in results {
                println!(
                    "[{:.3}] unit {} {}#{}\n{}\n",
                    result.similarity,
                    result.chunk.metadata.unit_number,
                    result.chunk.document_id,
                    result.chunk.chunk_index,
                    result.chunk.content
                );
            }
        }
        Command::Paper(PaperCommand::Create {
            subject,
            title,
            units,
            difficulty,
            mcq,
            fill_blanks,
            short,
            long,
            instructions,
        }) => {
            let difficulty: Difficulty = difficulty.parse()?;
            let paper = pipeline
                .catalog
                .create_draft(DraftRequest {
                    faculty_id: faculty.to_string(),
                    subject_id: subject,
                    title,
                    units,
                    difficulty,
                    question_config: QuestionConfig::new(mcq, fill_blanks, short, long),
                    custom_instructions: instructions,
                })
                .await?;
            println!("{}", paper.id);
        }
        Command::Paper(PaperCommand::List) => {
            for paper in pipeline.catalog.list_papers(faculty).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    paper.id,
                    paper.status,
                    paper.created_at.format("%Y-%m-%d %H:%M"),
                    paper.title
                );
            }
        }
        Command::Paper(PaperCommand::Show { paper }) => {
            let paper = pipeline.catalog.paper(&paper, faculty).await?;
            println!("{}", serde_json::to_string_pretty(&paper)?);
        }
        Command::Generate { paper, poll_ms } => generate(pipeline, faculty, &paper, poll_ms).await?,
        Command::Status { paper } => {
            let job = pipeline.generation.status(&paper, faculty).await?;
            print_job(&job)?;
        }
    }
    Ok(())
}

async fn process_document(pipeline: &Pipeline, faculty: &str, document_id: &str) -> Result<()> {
    let handle = pipeline.documents.submit(document_id, faculty).await?;
    let status = handle.await.context("text extraction task panicked")?;
    println!("OCR {status}");
    let document = pipeline.documents.get(document_id, faculty).await?;
    if let Some(text) = document.text() {
        println!("{} characters extracted", text.chars().count());
    }
    Ok(())
}

async fn generate(pipeline: &Pipeline, faculty: &str, paper_id: &str, poll_ms: u64) -> Result<()> {
    let sweeper = pipeline
        .jobs()
        .clone()
        .spawn_sweeper(pipeline.config().job_ttl(), Duration::from_secs(60));
    let outcome = wait_for_job(pipeline, faculty, paper_id, poll_ms).await;
    sweeper.abort();

    let job = outcome?;
    print_job(&job)?;
    if job.state == JobState::Failed {
        bail!("generation failed");
    }
    Ok(())
}

/// Polls the job status until it is terminal or the background task exits.
async fn wait_for_job(
    pipeline: &Pipeline,
    faculty: &str,
    paper_id: &str,
    poll_ms: u64,
) -> Result<GenerationJob> {
    let ticket = pipeline.generation.start(paper_id, faculty).await?;
    tracing::info!(paper_id, "generation accepted");

    let mut task = ticket.task;
    let mut interval = tokio::time::interval(Duration::from_millis(poll_ms.max(50)));
    let mut last = ticket.job.state;
    loop {
        tokio::select! {
            joined = &mut task => {
                return joined.context("generation task stopped before finishing");
            }
            _ = interval.tick() => {
                let job = pipeline.generation.status(paper_id, faculty).await?;
                if job.state != last {
                    eprintln!("status: {:?}", job.state);
                    last = job.state;
                }
                if job.state.is_terminal() {
                    return Ok(job);
                }
            }
        }
    }
}

fn print_job(job: &GenerationJob) -> Result<()> {
    println!("paper {}: {:?}", job.paper_id, job.state);
    if let Some(error) = &job.error {
        println!("error: {error}");
    }
    if let Some(questions) = &job.questions {
        println!("{}", serde_json::to_string_pretty(questions)?);
    }
    Ok(())
}
