//! # notes-rag
//!
//! A minimal retrieval-augmented generation helper for study notes.
//!
//! Text is split into overlapping windows, embedded in one batch by a
//! pluggable provider, and persisted to a single JSON file. Queries are
//! embedded the same way and ranked by cosine similarity; the top passages
//! come back as a plain-text context block ready for a prompt.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌────────────┐
//! │  add / POST │──▶│ Chunk+Embed │──▶│ rag_db.json│
//! │  documents  │   │  (one batch)│   │ (atomic)   │
//! └─────────────┘   └─────────────┘   └─────┬──────┘
//!                                           │
//!                      ┌────────────────────┤
//!                      ▼                    ▼
//!                 ┌──────────┐        ┌──────────┐
//!                 │   CLI    │        │   HTTP   │
//!                 │ (query)  │        │ /context │
//!                 └──────────┘        └──────────┘
//! ```
//!
//! The pure retrieval logic (chunker, similarity, ranking, facade) lives in
//! the `notes-rag-core` crate. This crate adds configuration, the HTTP
//! embedding client, the JSON file store, text extraction, and the
//! CLI/server surfaces.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Provider + store wiring |
//! | [`embedding`] | OpenAI-compatible embedding client |
//! | [`extract`] | Plain text and PDF extraction |
//! | [`ingest`] | `add` / `add-text` commands |
//! | [`json_store`] | Atomic JSON file persistence |
//! | [`search`] | `query` command |
//! | [`server`] | HTTP server |
//! | [`stats`] | `stats` command |

pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod json_store;
pub mod search;
pub mod server;
pub mod stats;
