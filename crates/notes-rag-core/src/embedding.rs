//! Embedding provider trait and vector utilities.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, plus the cosine similarity used by the ranker.
//!
//! Concrete provider implementations (OpenAI-compatible HTTP, disabled)
//! live in the `notes-rag` app crate. The core never retries a failed
//! call; retry policy belongs to whoever constructs the provider.

use async_trait::async_trait;

use crate::error::RagError;

/// Trait for embedding providers.
///
/// A provider is constructed once at startup and shared by handle
/// (`Arc<dyn EmbeddingProvider>`) with the [`Rag`](crate::rag::Rag) facade.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding dimensionality, or `0` if unknown until the
    /// first response.
    fn dims(&self) -> usize;

    /// Embed a batch of texts, one vector per input in input order.
    ///
    /// # Errors
    ///
    /// [`RagError::ProviderUnavailable`] on transport, auth, or rate-limit
    /// failure, or when the response does not match the request.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, RagError>;
}

/// Embed a single query text.
///
/// Sends a 1-element batch and unwraps the single result.
pub async fn embed_query(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f64>, RagError> {
    provider
        .embed(&[text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| RagError::provider("empty embedding response"))
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns exactly `0.0` when either vector has zero norm, when the
/// vectors are empty, or when their lengths differ. Never returns NaN.
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_nan() {
        0.0
    } else {
        sim
    }
}
