//! # Margin CLI
//!
//! Command-line host for the Margin search engine. It plays the role of the
//! editor application: it keeps the index snapshot on disk, feeds documents
//! to the search worker and prints results.
//!
//! ## Commands
//!
//! - `margin index <paths>` - Add documents to the stored index
//! - `margin query <criteria>` - Search documents, snippets and references
//! - `margin interactive` - Search line by line from a prompt
//! - `margin status` - Show index status and statistics
//! - `margin clear` - Delete the stored index
//!
//! ## Example Usage
//!
//! ```bash
//! # Index a folder of notes
//! margin index ~/notes
//!
//! # Search them
//! margin query "hello"
//!
//! # Find a diagram template
//! margin query "mermaid:sequence"
//! ```

mod app;
mod commands;
mod snapshot_file;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Margin - Search notes, snippets and references
#[derive(Parser)]
#[command(name = "margin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files to the document index
    Index {
        /// Files or directories to index (directories are walked recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Start from an empty index instead of extending the stored one
        #[arg(short, long)]
        fresh: bool,
    },

    /// Search documents, snippets and references
    Query {
        /// Search criteria (use "<marker>:<prefix>" for snippets)
        criteria: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Search interactively, one query per line
    #[command(alias = "i")]
    Interactive,

    /// Show index status and statistics
    Status,

    /// Delete the stored index
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => margin_core::Config::load_from(path)?,
        None => margin_core::Config::load()?,
    };

    // Setup logging; flags win over the configured level
    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.general.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Execute command
    match cli.command {
        Commands::Index { paths, fresh } => commands::index::run(config, paths, fresh),
        Commands::Query { criteria, output } => commands::query::run(config, &criteria, output),
        Commands::Interactive => commands::interactive::run(config),
        Commands::Status => commands::status::run(config),
        Commands::Clear { yes } => commands::clear::run(config, yes),
    }
}
