//! Document ingestion commands.
//!
//! `notes-rag add <path>` extracts text from a file (plain text or PDF)
//! and `notes-rag add-text <text>` takes it inline; both chunk, embed in a
//! single batch, and persist through the facade.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::info;

use notes_rag_core::models::Meta;

use crate::config::Config;
use crate::db;
use crate::extract;

/// Chunking overrides from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkArgs {
    pub chunk_size: Option<usize>,
    pub overlap: Option<usize>,
}

impl ChunkArgs {
    fn resolve(self, config: &Config) -> (usize, usize) {
        (
            self.chunk_size.unwrap_or(config.chunking.chunk_size),
            self.overlap.unwrap_or(config.chunking.overlap),
        )
    }
}

/// Ingest a file. `source` defaults to the file name.
pub async fn run_add(config: &Config, path: &Path, source: Option<String>, chunking: ChunkArgs) -> Result<()> {
    let text = extract::extract_file(path)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;

    let source = source.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });

    ingest(config, &text, &source, chunking).await
}

/// Ingest inline text.
pub async fn run_add_text(config: &Config, text: &str, source: Option<String>, chunking: ChunkArgs) -> Result<()> {
    ingest(config, text, source.as_deref().unwrap_or("cli"), chunking).await
}

async fn ingest(config: &Config, text: &str, source: &str, chunking: ChunkArgs) -> Result<()> {
    if text.trim().is_empty() {
        bail!("No text to ingest from '{}'", source);
    }

    let (chunk_size, overlap) = chunking.resolve(config);
    let rag = db::open(config)?;

    let mut meta = Meta::new();
    meta.insert("source".to_string(), serde_json::Value::from(source));

    let added = rag.add_document(text, Some(meta), chunk_size, overlap).await?;
    let total = rag.len()?;

    info!(source, added, total, "ingested document");
    println!("added {} chunks from {} (store now holds {})", added, source, total);
    Ok(())
}
