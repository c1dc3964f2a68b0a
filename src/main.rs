//! # notes-rag CLI
//!
//! ## Usage
//!
//! ```bash
//! notes-rag --config ./config/notes-rag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `notes-rag add <path>` | Ingest a text or PDF file |
//! | `notes-rag add-text "<text>"` | Ingest inline text |
//! | `notes-rag query "<question>"` | Print the top-K context block |
//! | `notes-rag stats` | Summarize the store |
//! | `notes-rag serve` | Start the HTTP server |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr so
//! stdout stays clean for context output.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notes_rag::ingest::ChunkArgs;
use notes_rag::{config, db, ingest, search, server, stats};

/// notes-rag: embed study notes and retrieve top-K context for prompts.
#[derive(Parser)]
#[command(name = "notes-rag", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// A missing file means built-in defaults.
    #[arg(long, global = true, default_value = "./config/notes-rag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed, and store a file (plain text or PDF).
    Add {
        /// File to ingest.
        path: PathBuf,

        /// Value stored as `meta.source` (defaults to the file name).
        #[arg(long)]
        source: Option<String>,

        /// Window length in characters.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared by consecutive windows.
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Chunk, embed, and store inline text.
    AddText {
        text: String,

        /// Value stored as `meta.source` (defaults to `cli`).
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        chunk_size: Option<usize>,

        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Print the top-K passages for a question as a context block.
    Query {
        query: String,

        /// Number of passages (defaults to `[retrieval].top_k`).
        #[arg(short, long)]
        k: Option<i64>,
    },

    /// Show chunk count, dimensions, and per-source breakdown.
    Stats,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Add {
            path,
            source,
            chunk_size,
            overlap,
        } => {
            ingest::run_add(&cfg, &path, source, ChunkArgs { chunk_size, overlap }).await?;
        }
        Commands::AddText {
            text,
            source,
            chunk_size,
            overlap,
        } => {
            ingest::run_add_text(&cfg, &text, source, ChunkArgs { chunk_size, overlap }).await?;
        }
        Commands::Query { query, k } => {
            search::run_query(&cfg, &query, k).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Serve => {
            let rag = Arc::new(db::open(&cfg)?);
            server::run_server(&cfg, rag).await?;
        }
    }

    Ok(())
}
