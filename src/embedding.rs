//! Embedding provider implementations.
//!
//! Implements the core [`EmbeddingProvider`] trait for:
//! - **[`DisabledProvider`]**: returns errors; used when embeddings are not configured.
//! - **[`OpenAiProvider`]**: calls any OpenAI-compatible `POST {base_url}/embeddings`
//!   endpoint with batching, retry, and backoff.
//!
//! Transport settings (base URL, credential, model, timeout) come from
//! [`EmbeddingConfig`] and are passed through unmodified; nothing here reads
//! or changes proxy variables in the process environment.
//!
//! # Provider Selection
//!
//! ```rust
//! # use notes_rag::config::EmbeddingConfig;
//! # use notes_rag::embedding::create_provider;
//! let config = EmbeddingConfig {
//!     provider: "disabled".to_string(),
//!     ..EmbeddingConfig::default()
//! };
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```
//!
//! # Retry Strategy
//!
//! Retries are a property of this HTTP provider, configured by
//! `embedding.max_retries`; the retrieval core itself never retries.
//! - HTTP 429 (rate limited) and 5xx (server error): retry
//! - HTTP 4xx (client error, not 429): fail immediately
//! - Network errors: retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use notes_rag_core::embedding::EmbeddingProvider;
use notes_rag_core::error::RagError;

use crate::config::EmbeddingConfig;

// ============ Disabled Provider ============

/// A no-op embedding provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"`. Queries against an empty
/// store still succeed because the facade never calls the provider then.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>, RagError> {
        Err(RagError::provider("embedding provider is disabled"))
    }
}

// ============ OpenAI-compatible Provider ============

/// Embedding provider for OpenAI-compatible `/embeddings` endpoints.
///
/// Holds one `reqwest::Client` for its lifetime; construct it once at
/// startup and share it.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dims: Option<usize>,
    max_retries: u32,
}

impl OpenAiProvider {
    /// Create a provider from configuration.
    ///
    /// The API key is read once from the environment variable named by
    /// `embedding.api_key_env`. A missing key is allowed (local servers
    /// often need none) but logged.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RagError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!(
                var = %config.api_key_env,
                "embedding API key not set; sending requests without credentials"
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit credential.
    pub fn with_api_key(config: &EmbeddingConfig, api_key: Option<String>) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims.unwrap_or(0)
    }

    /// Call the embeddings endpoint with retry/backoff.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, RagError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying embedding request");
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await.map_err(|e| {
                            RagError::provider(format!("invalid embeddings response: {}", e))
                        })?;
                        let vectors = parse_embeddings_response(&json)?;
                        return self.check_response(texts.len(), vectors);
                    }

                    let body_text = response.text().await.unwrap_or_default();

                    // Rate limited or server error, retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(%status, attempt, "embedding request failed");
                        last_err = Some(RagError::provider(format!(
                            "embeddings API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    // Client error (not 429), no retry
                    return Err(RagError::provider(format!(
                        "embeddings API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    warn!(error = %e, attempt, "embedding request failed");
                    last_err = Some(RagError::provider(format!(
                        "connection to {} failed: {}",
                        self.endpoint, e
                    )));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| RagError::provider("embedding failed after retries")))
    }
}

impl OpenAiProvider {
    fn check_response(&self, expected: usize, vectors: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>, RagError> {
        if vectors.len() != expected {
            return Err(RagError::provider(format!(
                "embeddings API returned {} vectors for {} inputs",
                vectors.len(),
                expected
            )));
        }
        if let Some(dims) = self.dims {
            if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
                return Err(RagError::provider(format!(
                    "embeddings API returned {}-d vector, configured dims = {}",
                    bad.len(),
                    dims
                )));
            }
        }
        Ok(vectors)
    }
}

/// Parse an OpenAI-style embeddings response.
///
/// Extracts `data[].embedding` and orders the vectors by `data[].index`
/// when present, so the output lines up with the request's input order.
pub fn parse_embeddings_response(json: &serde_json::Value) -> Result<Vec<Vec<f64>>, RagError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| RagError::provider("invalid embeddings response: missing data array"))?;

    let mut indexed = Vec::with_capacity(data.len());

    for (pos, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| RagError::provider("invalid embeddings response: missing embedding"))?;

        let vec = embedding
            .iter()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| RagError::provider("invalid embeddings response: non-numeric value"))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(pos);
        indexed.push((index, vec));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

/// Create the configured [`EmbeddingProvider`].
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"openai"` | [`OpenAiProvider`] |
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, RagError> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        other => Err(RagError::invalid_config(format!(
            "unknown embedding provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_orders_by_index() {
        let json = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vectors = parse_embeddings_response(&json).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_response_without_index_keeps_order() {
        let json = json!({ "data": [ { "embedding": [0.5] }, { "embedding": [0.25] } ] });
        let vectors = parse_embeddings_response(&json).unwrap();
        assert_eq!(vectors, vec![vec![0.5], vec![0.25]]);
    }

    #[test]
    fn test_parse_response_missing_data() {
        let err = parse_embeddings_response(&json!({ "error": "nope" })).unwrap_err();
        assert!(matches!(err, RagError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_parse_response_non_numeric() {
        let json = json!({ "data": [ { "embedding": [0.5, "x"] } ] });
        assert!(parse_embeddings_response(&json).is_err());
    }

    #[test]
    fn test_endpoint_from_base_url() {
        let config = EmbeddingConfig {
            base_url: "https://api.a4f.co/v1/".to_string(),
            ..EmbeddingConfig::default()
        };
        let provider = OpenAiProvider::with_api_key(&config, None).unwrap();
        assert_eq!(provider.endpoint(), "https://api.a4f.co/v1/embeddings");
    }

    #[test]
    fn test_check_response_dims() {
        let config = EmbeddingConfig {
            dims: Some(2),
            ..EmbeddingConfig::default()
        };
        let provider = OpenAiProvider::with_api_key(&config, None).unwrap();
        assert!(provider.check_response(1, vec![vec![1.0, 0.0]]).is_ok());
        assert!(provider.check_response(1, vec![vec![1.0]]).is_err());
        assert!(provider.check_response(2, vec![vec![1.0, 0.0]]).is_err());
    }

    #[tokio::test]
    async fn test_disabled_provider_errors() {
        let err = DisabledProvider.embed(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, RagError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_unavailable() {
        let config = EmbeddingConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            max_retries: 0,
            ..EmbeddingConfig::default()
        };
        let provider = OpenAiProvider::with_api_key(&config, Some("k".to_string())).unwrap();
        let err = provider.embed(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, RagError::ProviderUnavailable(_)));
    }
}
