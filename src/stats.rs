//! Store statistics.
//!
//! Summarizes what is stored: chunk count, embedding dimensionality,
//! per-source breakdown, and the configured provider. Used by
//! `notes-rag stats`.

use anyhow::Result;
use std::collections::BTreeMap;

use notes_rag_core::store::ChunkStore;

use crate::config::Config;
use crate::db;

/// Run the stats command: load the store and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let rag = db::open(config)?;

    let (path, total, dims, per_source) = rag.with_store(|store| {
        let mut per_source: BTreeMap<String, usize> = BTreeMap::new();
        for chunk in store.chunks() {
            *per_source.entry(chunk.source_label()).or_default() += 1;
        }
        (store.path().to_path_buf(), store.len(), store.dims(), per_source)
    })?;

    let size = std::fs::metadata(&path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("notes-rag store stats");
    println!("=======================");
    println!();
    println!("  Store:       {}", path.display());
    println!("  Size:        {}", format_bytes(size));
    println!("  Chunks:      {}", total);
    println!(
        "  Dimensions:  {}",
        dims.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Provider:    {} ({})",
        config.embedding.provider,
        rag.provider().model_name()
    );

    if !per_source.is_empty() {
        println!();
        println!("  {:<32} {:>8}", "SOURCE", "CHUNKS");
        for (source, count) in &per_source {
            println!("  {:<32} {:>8}", source, count);
        }
    }

    Ok(())
}

/// Format a byte count in human-readable form.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
