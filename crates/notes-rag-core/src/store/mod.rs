//! Storage abstraction for the chunk store.
//!
//! The [`ChunkStore`] trait is the append-only, ordered collection the
//! [`Rag`](crate::rag::Rag) facade ranks against. Implementations own
//! their backing medium exclusively and rewrite it in full on every
//! mutation.
//!
//! Implementations are not internally synchronized; the facade wraps the
//! store in a lock so that an append and its persistence happen as one
//! unit with respect to readers.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`chunks`](ChunkStore::chunks) | Ordered view of all stored chunks |
//! | [`dims`](ChunkStore::dims) | Embedding dimensionality, if non-empty |
//! | [`append`](ChunkStore::append) | Add chunks, then persist the whole store |
//! | [`save`](ChunkStore::save) | Persist the whole store |

pub mod memory;

use crate::error::RagError;
use crate::models::Chunk;

pub use memory::InMemoryStore;

/// Ordered, append-only chunk collection with a persistent mirror.
pub trait ChunkStore: Send + Sync {
    /// All chunks in insertion order.
    fn chunks(&self) -> &[Chunk];

    /// Append `chunks` and persist the full store.
    ///
    /// On failure the in-memory sequence is left as it was before the call.
    ///
    /// # Errors
    ///
    /// [`RagError::DimensionMismatch`] if any new embedding differs in
    /// length from the store's; [`RagError::Io`] if persisting fails.
    fn append(&mut self, chunks: Vec<Chunk>) -> Result<(), RagError>;

    /// Persist the full store to its backing medium.
    fn save(&self) -> Result<(), RagError>;

    /// Embedding dimensionality shared by every stored chunk.
    fn dims(&self) -> Option<usize> {
        self.chunks().first().map(|c| c.embedding.len())
    }

    fn len(&self) -> usize {
        self.chunks().len()
    }

    fn is_empty(&self) -> bool {
        self.chunks().is_empty()
    }
}

/// Verify that `incoming` can join a store of dimension `existing`.
///
/// Every incoming embedding must match `existing`, or, for an empty store,
/// the first incoming embedding.
pub fn check_dims(existing: Option<usize>, incoming: &[Chunk]) -> Result<(), RagError> {
    let expected = match existing.or_else(|| incoming.first().map(|c| c.embedding.len())) {
        Some(d) => d,
        None => return Ok(()),
    };
    match incoming.iter().find(|c| c.embedding.len() != expected) {
        Some(bad) => Err(RagError::DimensionMismatch {
            expected,
            actual: bad.embedding.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Meta;

    fn chunk(dims: usize) -> Chunk {
        Chunk::new("t", vec![0.5; dims], Meta::new())
    }

    #[test]
    fn test_check_dims_empty_store_uniform_batch() {
        assert!(check_dims(None, &[chunk(4), chunk(4)]).is_ok());
        assert!(check_dims(None, &[]).is_ok());
    }

    #[test]
    fn test_check_dims_mixed_batch() {
        let err = check_dims(None, &[chunk(4), chunk(3)]).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_check_dims_against_store() {
        assert!(check_dims(Some(8), &[chunk(8)]).is_ok());
        assert!(matches!(
            check_dims(Some(8), &[chunk(16)]),
            Err(RagError::DimensionMismatch {
                expected: 8,
                actual: 16
            })
        ));
    }
}
