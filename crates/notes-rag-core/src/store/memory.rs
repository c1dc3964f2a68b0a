//! In-memory [`ChunkStore`] implementation for tests and embedders that
//! do not need persistence.

use crate::error::RagError;
use crate::models::Chunk;

use super::{check_dims, ChunkStore};

/// Vec-backed store; [`save`](ChunkStore::save) is a no-op.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    chunks: Vec<Chunk>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing chunks.
    ///
    /// # Errors
    ///
    /// [`RagError::DimensionMismatch`] if the chunks mix dimensionalities.
    pub fn with_chunks(chunks: Vec<Chunk>) -> Result<Self, RagError> {
        check_dims(None, &chunks)?;
        Ok(Self { chunks })
    }
}

impl ChunkStore for InMemoryStore {
    fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    fn append(&mut self, chunks: Vec<Chunk>) -> Result<(), RagError> {
        check_dims(self.dims(), &chunks)?;
        self.chunks.extend(chunks);
        self.save()
    }

    fn save(&self) -> Result<(), RagError> {
        Ok(())
    }
}
