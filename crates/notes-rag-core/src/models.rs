//! Core data model: the stored [`Chunk`] record.

use serde::{Deserialize, Serialize};

/// Free-form chunk metadata (e.g. `{"source": "biology.pdf"}`).
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A stored passage: its text, its embedding vector, and metadata.
///
/// This is also the on-disk record shape. All four fields are required
/// when deserializing; a record missing any of them is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Opaque unique identifier (UUID v4).
    pub id: String,
    /// Passage text.
    pub text: String,
    /// Embedding vector; same length for every chunk in a store.
    pub embedding: Vec<f64>,
    /// Metadata supplied at ingestion time.
    pub meta: Meta,
}

impl Chunk {
    /// Build a chunk with a fresh UUID.
    pub fn new(text: impl Into<String>, embedding: Vec<f64>, meta: Meta) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            embedding,
            meta,
        }
    }

    /// The `source` label used in citations, or `"unknown"` when absent.
    ///
    /// String values are returned verbatim; other scalars use their JSON form.
    pub fn source_label(&self) -> String {
        match self.meta.get("source") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }
}
