//! Terminal chat with the health assistant.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;

use talkdoc::core::config::{AppPaths, ConfigService};
use talkdoc::core::logging;
use talkdoc::shell;
use talkdoc::state::AppState;

/// Ask health questions against the local knowledge base and the web.
#[derive(Parser, Debug)]
#[command(name = "talkdoc-chat", version, about, long_about = None)]
struct Cli {
    /// Index file to load instead of the configured one
    #[arg(long)]
    index: Option<PathBuf>,

    /// Skip the medical-topic classifier
    #[arg(long)]
    no_topic_gate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "talkdoc-chat.log");

    let config = ConfigService::new(paths.clone());
    let mut settings = config.load_settings()?;
    if let Some(index) = cli.index {
        settings.rag.index_path = Some(index);
    }
    if cli.no_topic_gate {
        settings.shell.topic_gate = false;
    }

    let state = AppState::from_settings(paths, config, settings).await?;

    println!("talkDOC health assistant (type 'exit' or 'quit' to leave)\n");
    shell::run(
        &state.pipeline,
        state.classifier.as_deref(),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(())
}
