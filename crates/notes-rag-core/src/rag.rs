//! Retrieval facade: ingestion and top-K context lookup.
//!
//! [`Rag`] composes the chunker, an injected [`EmbeddingProvider`], a
//! [`ChunkStore`], and the ranker.
//!
//! # Concurrency
//!
//! The store sits behind a `RwLock`. The embedding call is made before any
//! lock is taken and no lock is held across an `.await`, so:
//!
//! - an `add_document` whose future is dropped while waiting on the
//!   provider leaves the store untouched;
//! - appends (in-memory mutation plus full-file rewrite) are serialized,
//!   so concurrent ingestions cannot overwrite each other;
//! - queries rank against either the pre- or post-append snapshot.
//!
//! The write lock is a blocking `std::sync::RwLock` and is held while the
//! store persists itself, including any `fsync`. Ingestion is rare and the
//! store small, so this briefly blocks the calling runtime worker; readers
//! wait at most one file rewrite.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use notes_rag_core::{Rag, Meta};
//! # use notes_rag_core::embedding::EmbeddingProvider;
//! # use notes_rag_core::store::InMemoryStore;
//! # async fn example(provider: Arc<dyn EmbeddingProvider>) -> Result<(), notes_rag_core::RagError> {
//! let rag = Rag::new(provider, InMemoryStore::new());
//! rag.add_document_default("Photosynthesis converts light into chemical energy.", None).await?;
//! let context = rag.topk_text("what is photosynthesis?", 5).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::chunk::{split_text, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::RagError;
use crate::models::{Chunk, Meta};
use crate::search::{top_k, ScoredChunk};
use crate::store::ChunkStore;

/// Default number of passages returned by [`Rag::topk_text`].
pub const DEFAULT_TOP_K: i64 = 5;

/// Embedding-backed passage store with top-K retrieval.
pub struct Rag<S: ChunkStore> {
    provider: Arc<dyn EmbeddingProvider>,
    store: RwLock<S>,
}

impl<S: ChunkStore> Rag<S> {
    /// Build a facade over `store`, embedding through `provider`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: S) -> Self {
        Self {
            provider,
            store: RwLock::new(store),
        }
    }

    /// The injected embedding provider.
    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> Result<usize, RagError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RagError> {
        Ok(self.read()?.is_empty())
    }

    /// Run `f` against a consistent snapshot of the store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> Result<R, RagError> {
        let store = self.read()?;
        Ok(f(&store))
    }

    /// Chunk, embed, and store a document.
    ///
    /// All windows are embedded in a single provider call. Each new chunk
    /// gets a fresh id and a copy of `meta`. The store is persisted before
    /// this returns. Returns the number of chunks added; text that yields
    /// no windows adds nothing and makes no provider call.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidConfiguration`] for `chunk_size <= overlap`,
    /// otherwise whatever the provider or store raised.
    pub async fn add_document(
        &self,
        text: &str,
        meta: Option<Meta>,
        chunk_size: usize,
        overlap: usize,
    ) -> Result<usize, RagError> {
        let windows = split_text(text, chunk_size, overlap)?;
        if windows.is_empty() {
            debug!("add_document: empty text, nothing to embed");
            return Ok(0);
        }

        let vectors = self.provider.embed(&windows).await?;
        if vectors.len() != windows.len() {
            return Err(RagError::provider(format!(
                "provider returned {} vectors for {} inputs",
                vectors.len(),
                windows.len()
            )));
        }

        let meta = meta.unwrap_or_default();
        let chunks: Vec<Chunk> = windows
            .into_iter()
            .zip(vectors)
            .map(|(text, embedding)| Chunk::new(text, embedding, meta.clone()))
            .collect();
        let added = chunks.len();

        let total = {
            let mut store = self.write()?;
            store.append(chunks)?;
            store.len()
        };

        info!(added, total, "stored document chunks");
        Ok(added)
    }

    /// [`add_document`](Self::add_document) with the default 800/120 windows.
    pub async fn add_document_default(&self, text: &str, meta: Option<Meta>) -> Result<usize, RagError> {
        self.add_document(text, meta, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP)
            .await
    }

    /// Top-`k` stored chunks for `q`, best first, with their scores.
    ///
    /// Returns an empty vector without calling the provider when `k <= 0`
    /// or the store is empty.
    pub async fn query(&self, q: &str, k: i64) -> Result<Vec<(f64, Chunk)>, RagError> {
        let query_vec = match self.embed_for_query(q, k).await? {
            Some(v) => v,
            None => return Ok(Vec::new()),
        };

        let store = self.read()?;
        check_query_dims(store.dims(), &query_vec)?;
        Ok(top_k(&query_vec, store.chunks(), k)
            .into_iter()
            .map(|r| (r.score, r.chunk.clone()))
            .collect())
    }

    /// Top-`k` passages for `q`, formatted as citation blocks.
    ///
    /// See [`format_context`]. An empty string means no context is
    /// available; it is not an error.
    pub async fn topk_text(&self, q: &str, k: i64) -> Result<String, RagError> {
        let query_vec = match self.embed_for_query(q, k).await? {
            Some(v) => v,
            None => return Ok(String::new()),
        };

        let store = self.read()?;
        check_query_dims(store.dims(), &query_vec)?;
        let results = top_k(&query_vec, store.chunks(), k);
        debug!(results = results.len(), "ranked context");
        Ok(format_context(&results))
    }

    async fn embed_for_query(&self, q: &str, k: i64) -> Result<Option<Vec<f64>>, RagError> {
        if k <= 0 {
            return Ok(None);
        }
        let empty = {
            let store = self.read()?;
            store.is_empty()
        };
        if empty {
            debug!("query against empty store");
            return Ok(None);
        }
        embed_query(self.provider.as_ref(), q).await.map(Some)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, S>, RagError> {
        self.store
            .read()
            .map_err(|_| RagError::Io(std::io::Error::other("chunk store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, S>, RagError> {
        self.store
            .write()
            .map_err(|_| RagError::Io(std::io::Error::other("chunk store lock poisoned")))
    }
}

fn check_query_dims(store_dims: Option<usize>, query_vec: &[f64]) -> Result<(), RagError> {
    match store_dims {
        Some(expected) if expected != query_vec.len() => Err(RagError::DimensionMismatch {
            expected,
            actual: query_vec.len(),
        }),
        _ => Ok(()),
    }
}

/// Format ranked chunks as context blocks for a prompt.
///
/// Each block is `[score=S source=L]` (score to 3 decimals, `L` from
/// `meta.source` or `unknown`) followed by the chunk text on the next
/// line. Blocks are separated by a blank line.
pub fn format_context(results: &[ScoredChunk<'_>]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "[score={:.3} source={}]\n{}",
                r.score,
                r.chunk.source_label(),
                r.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
