//! Docent CLI
//!
//! Main entry point for the docent command-line tool.
//! Answers questions from a local document collection without leaving the machine.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AddCommand, AskCommand, ChatCommand, IngestCommand, StatsCommand};
use docent_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Docent - offline question answering over your own documents
#[derive(Parser, Debug)]
#[command(name = "docent")]
#[command(about = "Offline question answering over your own documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCENT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: .docent/config.yaml)
    #[arg(short, long, global = true, env = "DOCENT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy documents into the knowledge base's documents directory
    Add(AddCommand),

    /// Rebuild the knowledge base from the documents directory
    Ingest(IngestCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Interactive question answering
    Chat(ChatCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Docent CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Embedding model: {}", config.embedding.model);
    tracing::debug!("Language model: {}", config.llm.model);

    config.ensure_docent_dir()?;

    let command_name = match &cli.command {
        Commands::Add(_) => "add",
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Add(cmd) => cmd.execute(&config),
        Commands::Ingest(cmd) => cmd.execute(config).await,
        Commands::Ask(cmd) => cmd.execute(config).await,
        Commands::Chat(cmd) => cmd.execute(config).await,
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
