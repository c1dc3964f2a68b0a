//! HTTP server exposing ingestion and context retrieval.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version and chunk count) |
//! | `POST` | `/documents` | Chunk, embed, and store a document |
//! | `POST` | `/context` | Top-K passages for a query, formatted as context |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "overlap (800) must be smaller than chunk_size (800)" } }
//! ```
//!
//! Error codes: `bad_request` (400), `timeout` (408),
//! `provider_unavailable` (502), `internal` (500).
//!
//! # CORS
//!
//! Origins listed in `[server].cors_origins` are allowed with any method
//! and header.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use notes_rag_core::error::RagError;
use notes_rag_core::models::Meta;
use notes_rag_core::Rag;

use crate::config::Config;
use crate::json_store::JsonFileStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    rag: Arc<Rag<JsonFileStore>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, rag: Arc<Rag<JsonFileStore>>) -> Self {
        Self { config, rag }
    }
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated; returns an error if binding fails.
pub async fn run_server(config: &Config, rag: Arc<Rag<JsonFileStore>>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::new(Arc::new(config.clone()), rag);
    let app = router(state);

    info!(addr = %bind_addr, "notes-rag server listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with CORS applied.
pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/documents", post(handle_add_document))
        .route("/context", post(handle_context))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        let (status, code) = match &err {
            RagError::InvalidConfiguration(_) | RagError::DimensionMismatch { .. } => {
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            RagError::ProviderUnavailable(_) => (StatusCode::BAD_GATEWAY, "provider_unavailable"),
            RagError::CorruptStore { .. } | RagError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        if status.is_server_error() {
            error!(error = %err, "request failed");
        }
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

/// Run `fut` under the configured request deadline.
///
/// On expiry the future is dropped; an ingestion cancelled this way has
/// not touched the store.
async fn with_deadline<T>(
    state: &AppState,
    fut: impl Future<Output = Result<T, RagError>>,
) -> Result<T, AppError> {
    let secs = state.config.server.request_timeout_secs;
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError {
            status: StatusCode::REQUEST_TIMEOUT,
            code: "timeout",
            message: format!("request timed out after {}s", secs),
        }),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: String,
    chunks: usize,
}

async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    Ok(Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        chunks: state.rag.len()?,
    }))
}

// ============ POST /documents ============

#[derive(Deserialize)]
struct AddDocumentRequest {
    text: String,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    chunk_size: Option<usize>,
    #[serde(default)]
    overlap: Option<usize>,
}

#[derive(Serialize)]
struct AddDocumentResponse {
    added: usize,
}

/// Handler for `POST /documents`.
///
/// Chunk parameters default to `[chunking]` from the config.
async fn handle_add_document(
    State(state): State<AppState>,
    Json(req): Json<AddDocumentRequest>,
) -> Result<Json<AddDocumentResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(bad_request("text must not be empty"));
    }
    let chunk_size = req.chunk_size.unwrap_or(state.config.chunking.chunk_size);
    let overlap = req.overlap.unwrap_or(state.config.chunking.overlap);

    let added = with_deadline(
        &state,
        state.rag.add_document(&req.text, req.meta, chunk_size, overlap),
    )
    .await?;

    Ok(Json(AddDocumentResponse { added }))
}

// ============ POST /context ============

#[derive(Deserialize)]
struct ContextRequest {
    query: String,
    #[serde(default)]
    k: Option<i64>,
}

#[derive(Serialize)]
struct ContextResponse {
    context: String,
}

/// Handler for `POST /context`.
///
/// An empty `context` string means nothing relevant is stored yet. A blank
/// query gets an empty context without embedding anything.
async fn handle_context(
    State(state): State<AppState>,
    Json(req): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Ok(Json(ContextResponse {
            context: String::new(),
        }));
    }
    let k = req.k.unwrap_or(state.config.retrieval.top_k);
    let context = with_deadline(&state, state.rag.topk_text(&req.query, k)).await?;
    Ok(Json(ContextResponse { context }))
}
