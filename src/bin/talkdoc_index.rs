//! Offline build of the vector index from dataset records, PDFs or text files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use talkdoc::core::config::{AppPaths, ConfigService};
use talkdoc::core::logging;
use talkdoc::embedding::HttpEmbeddingProvider;
use talkdoc::rag::{load_documents, ChunkerConfig, DatasetFields, IndexBuilder};

#[derive(Parser, Debug)]
#[command(name = "talkdoc-index", version, about, long_about = None)]
struct Cli {
    /// Corpus files (.jsonl, .json, .pdf, .txt, .md)
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Output index file (defaults to the configured index path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Dataset field holding the symptom description
    #[arg(long, default_value = "text")]
    symptoms_field: String,

    /// Dataset field holding the diagnosis
    #[arg(long, default_value = "diagnosis")]
    diagnosis_field: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "talkdoc-index.log");

    let settings = ConfigService::new(paths.clone()).load_settings()?;

    let chunker = ChunkerConfig {
        chunk_size: cli.chunk_size.unwrap_or(settings.rag.chunk_size),
        chunk_overlap: cli.chunk_overlap.unwrap_or(settings.rag.chunk_overlap),
    };
    if chunker.chunk_size == 0 || chunker.chunk_overlap >= chunker.chunk_size {
        anyhow::bail!(
            "chunk overlap ({}) must be smaller than a non-zero chunk size ({})",
            chunker.chunk_overlap,
            chunker.chunk_size
        );
    }

    let fields = DatasetFields {
        symptoms: cli.symptoms_field,
        diagnosis: cli.diagnosis_field,
    };

    let mut documents = Vec::new();
    for input in &cli.input {
        let loaded = load_documents(input, &fields)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        tracing::info!("Read {} documents from {}", loaded.len(), input.display());
        documents.extend(loaded);
    }

    let embedder = Arc::new(HttpEmbeddingProvider::new(
        &settings.embedding.base_url,
        settings.embedding.model.clone(),
        settings.secrets.embedding_api_key.clone(),
    ));
    let builder = IndexBuilder::new(embedder, chunker, settings.embedding.batch_size);

    let output = cli.output.unwrap_or_else(|| settings.index_path(&paths));
    let report = builder.build(&documents, &output).await?;

    println!(
        "Indexed {} passages from {} documents into {}",
        report.passages,
        report.documents,
        output.display()
    );
    Ok(())
}
