use anyhow::{Context, Result};
use tracing::warn;

use notes_rag_core::Rag;

use crate::config::Config;
use crate::embedding;
use crate::json_store::JsonFileStore;

/// Construct the provider and load the store, then wire them into a facade.
///
/// The provider is built exactly once here and injected; nothing else
/// creates embedding clients.
pub fn open(config: &Config) -> Result<Rag<JsonFileStore>> {
    if !config.embedding.is_enabled() {
        warn!("embedding provider disabled; only empty-store queries will succeed");
    }

    let provider = embedding::create_provider(&config.embedding)
        .context("Failed to create embedding provider")?;

    let store = JsonFileStore::open(&config.store.path)
        .with_context(|| format!("Failed to open store: {}", config.store.path.display()))?;

    Ok(Rag::new(provider, store))
}
