//! askpdf CLI
//!
//! Main entry point for the askpdf command-line tool.
//! Provides commands for indexing a PDF and asking page-focused questions.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, BuildCommand, ContextCommand, StatsCommand};
use askpdf_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// askpdf - ask questions about a page of a PDF document
#[derive(Parser, Debug)]
#[command(name = "askpdf")]
#[command(about = "Index a PDF and ask questions about its pages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "ASKPDF_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ASKPDF_CONFIG")]
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

    /// LLM provider (groq, ollama)
    #[arg(short, long, global = true, env = "ASKPDF_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "ASKPDF_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, embed, and index a PDF into a bundle
    Build(BuildCommand),

    /// Ask a question about a page of an indexed PDF
    Ask(AskCommand),

    /// Print the retrieved context block without calling the LLM
    Context(ContextCommand),

    /// Show bundle statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    // Log startup
    tracing::info!("askpdf starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Ensure .askpdf directory exists
    config.ensure_askpdf_dir()?;

    // Emit command.start span
    let command_name = match &cli.command {
        Commands::Build(_) => "build",
        Commands::Ask(_) => "ask",
        Commands::Context(_) => "context",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Build(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Context(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
