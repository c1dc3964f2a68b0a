//! Exact top-K similarity ranking.
//!
//! Brute-force cosine similarity of a query vector against every stored
//! chunk. There is no index: the store is expected to hold at most a few
//! thousand chunks.
//!
//! # Ordering
//!
//! Results are sorted by score descending. Equal scores keep insertion
//! order (the chunk stored first ranks first), so duplicate embeddings
//! produce deterministic output.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::models::Chunk;

/// A ranked chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    /// Cosine similarity in `[-1.0, 1.0]`; `0.0` for zero-norm vectors.
    pub score: f64,
    /// Position of the chunk in the store (insertion order).
    pub index: usize,
    /// The stored chunk.
    pub chunk: &'a Chunk,
}

/// Rank `chunks` against `query` and return the `k` best.
///
/// Returns `min(k, chunks.len())` results. An empty store or `k <= 0`
/// yields an empty vector; this function never fails.
pub fn top_k<'a>(query: &[f64], chunks: &'a [Chunk], k: i64) -> Vec<ScoredChunk<'a>> {
    if k <= 0 || chunks.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredChunk<'a>> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| ScoredChunk {
            score: cosine_similarity(query, &chunk.embedding),
            index,
            chunk,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });

    let limit = usize::try_from(k).unwrap_or(usize::MAX);
    scored.truncate(limit);
    scored
}
