//! Oracle CLI - conversational question answering against local models
//!
//! Starts an interactive session by default; the `models` subcommand
//! lists what the configured provider can serve.

mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oracle_core::{Oracle, OracleConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oraclectl")]
#[command(about = "Local LLM question answering with search augmentation", long_about = None)]
#[command(version)]
struct Cli {
    /// Generation model name
    #[arg(long)]
    model: Option<String>,

    /// LLM provider (ollama, lm-studio)
    #[arg(long)]
    provider: Option<String>,

    /// Search engine for answer augmentation (google, bing, yahoo,
    /// duckduckgo, brave)
    #[arg(long)]
    search: Option<String>,

    /// Result pages fetched per search
    #[arg(long)]
    pages: Option<u32>,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List models available from the configured provider
    Models,
}

/// Config file first, CLI flags on top
fn build_config(cli: &Cli) -> Result<OracleConfig> {
    let mut config = match &cli.config {
        Some(path) => OracleConfig::load_from(path)?,
        None => OracleConfig::load()?,
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(provider) = &cli.provider {
        config.provider = provider.parse()?;
    }
    if let Some(engine) = &cli.search {
        config.search_engine = Some(engine.parse()?);
    }
    if let Some(pages) = cli.pages {
        config.search_pages = pages.max(1);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli).context("invalid configuration")?;
    tracing::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Some(Commands::Models) => {
            let oracle = Oracle::new(config);
            let models = oracle
                .list_models()
                .await
                .context("could not reach the model backend")?;
            for model in models {
                println!("{}", model);
            }
            Ok(())
        }
        None => repl::run(config).await,
    }
}
