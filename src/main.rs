//! # Notes Harness CLI (`notes`)
//!
//! ## Usage
//!
//! ```bash
//! notes --config ./config/notes.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `notes init` | Create the index database and its tables |
//! | `notes index` | Rebuild the index from the Notes database |
//! | `notes search "<query>"` | Search indexed notes |
//! | `notes list` | List notes in the Notes database |
//! | `notes get "<title>"` | Print one decoded note |
//! | `notes stats` | Show index statistics |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `warn`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use notes_harness::{config, get, index, migrate, search, stats};

/// Notes Harness CLI: index and search macOS Notes locally.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "notes",
    about = "Notes Harness: local hybrid search over macOS Notes",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/notes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the index database schema. Safe to run repeatedly.
    Init,

    /// Rebuild the index from the Notes database.
    ///
    /// Every pass replaces the previous index contents.
    Index {
        /// Only index the N most recently modified notes.
        #[arg(long)]
        limit: Option<usize>,

        /// Show note and chunk counts without writing to the index.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search indexed notes.
    Search {
        query: String,

        /// Search mode: `keyword`, `semantic`, or `hybrid`.
        #[arg(long, default_value = "hybrid")]
        mode: String,

        /// Maximum number of results (defaults to `retrieval.final_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List notes, most recently modified first.
    List {
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print the decoded text of a note by exact title.
    Get {
        title: String,

        #[arg(long)]
        json: bool,
    },

    /// Show index statistics.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Index { limit, dry_run } => {
            index::run_index(&cfg, limit, dry_run).await?;
        }
        Commands::Search {
            query,
            mode,
            limit,
            json,
        } => {
            search::run_search(&cfg, &query, &mode, limit, json).await?;
        }
        Commands::List { limit, json } => {
            get::run_list(&cfg, limit, json).await?;
        }
        Commands::Get { title, json } => {
            get::run_get(&cfg, &title, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
