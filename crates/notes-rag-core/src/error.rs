//! Error taxonomy for the retrieval core.
//!
//! Every fallible core operation returns [`RagError`]. Nothing in the core
//! retries or swallows these; callers decide whether to retry, degrade
//! (serve without retrieved context), or fail the request.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the chunker, embedding provider, store, and facade.
#[derive(Error, Debug)]
pub enum RagError {
    /// Chunker parameters that would produce a non-positive stride.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The embedding call failed (network, auth, rate limit) or returned
    /// a malformed response.
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The backing file exists but is not a valid sequence of chunk records.
    #[error("corrupt store at {}: {reason}", path.display())]
    CorruptStore { path: PathBuf, reason: String },

    /// Appending would mix embeddings of different dimensionality.
    #[error("dimension mismatch: store holds {expected}-d embeddings, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Reading or writing the backing file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        RagError::InvalidConfiguration(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        RagError::ProviderUnavailable(msg.into())
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RagError::CorruptStore {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
