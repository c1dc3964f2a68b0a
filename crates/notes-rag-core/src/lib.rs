//! # notes-rag core
//!
//! Retrieval engine for notes-rag: chunk model, error taxonomy, chunking,
//! store abstraction, similarity ranking, embedding trait, and the
//! [`rag::Rag`] facade that composes them.
//!
//! This crate contains no tokio, HTTP client, or filesystem I/O. Concrete
//! embedding providers and the JSON file store live in the `notes-rag`
//! app crate.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod models;
pub mod rag;
pub mod search;
pub mod store;

pub use error::RagError;
pub use models::{Chunk, Meta};
pub use rag::Rag;
