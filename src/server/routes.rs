//! HTTP route handlers for the TalkFlow API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::rag::core::errors::RagError;
use crate::rag::core::record::ScoredResult;
use crate::rag::prompt::personas::Persona;
use crate::rag::retrieval::orchestrator::RetrievalStrategy;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/personalities", get(personalities))
        .route("/api/upload", post(upload_document))
        .route("/api/ask", post(ask))
        .route("/api/search", post(search))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "talkflow",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List selectable personas.
async fn personalities() -> impl IntoResponse {
    let names: Vec<&str> = Persona::ALL.iter().map(|p| p.as_str()).collect();
    Json(serde_json::json!({ "personalities": names }))
}

fn error_response(err: &RagError) -> (StatusCode, String) {
    let status = match err {
        RagError::DimensionMismatch { .. }
        | RagError::InvalidConfig(_)
        | RagError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Search result DTO.
#[derive(Debug, Serialize)]
pub struct PassageDto {
    /// Record id.
    pub id: String,
    /// Strategy-relative score.
    pub score: f64,
    /// Chunk text.
    pub text: String,
    /// Source document name, if known.
    pub source: Option<String>,
}

impl From<ScoredResult> for PassageDto {
    fn from(r: ScoredResult) -> Self {
        Self {
            id: r.id.to_string(),
            score: r.score,
            text: r.metadata.text,
            source: r.metadata.source,
        }
    }
}

/// Document upload request (already-extracted text).
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Source document name.
    pub filename: String,
    /// Extracted document text.
    pub text: String,
    /// Optional tags to store with every chunk.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Document upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// "ok" when chunks were added, "empty" otherwise.
    pub status: String,
    /// Number of chunks added to the store.
    pub added_chunks: usize,
    /// Id assigned to the document.
    pub document_id: String,
}

/// Handle document uploads.
async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let report = state
        .engine
        .ingest_document(&request.filename, &request.text, request.metadata)
        .await
        .map_err(|e| error_response(&e))?;

    let status = if report.added_chunks > 0 { "ok" } else { "empty" };
    Ok(Json(UploadResponse {
        status: status.to_string(),
        added_chunks: report.added_chunks,
        document_id: report.document_id.to_string(),
    }))
}

/// Question request.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The user question.
    pub question: String,
    /// Optional persona name; unknown names fall back to the default.
    pub personality: Option<String>,
    /// Optional result-count override.
    pub top_k: Option<usize>,
}

/// Grounded answer response.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// The generated answer.
    pub answer: String,
    /// Persona the answer was generated under.
    pub personality: String,
    /// Passages that grounded the answer.
    pub passages: Vec<PassageDto>,
}

/// Handle grounded question answering.
async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let persona = request
        .personality
        .as_deref()
        .map_or_else(Persona::default, Persona::parse_lossy);

    let grounded = state
        .engine
        .ask(&request.question, persona, request.top_k)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(AskResponse {
        answer: grounded.answer,
        personality: grounded.persona.to_string(),
        passages: grounded.passages.into_iter().map(PassageDto::from).collect(),
    }))
}

/// Diagnostic search request.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// The search query.
    pub query: String,
    /// Strategy to use; defaults to the orchestrated policy.
    #[serde(default)]
    pub strategy: RetrievalStrategy,
    /// Optional result-count override.
    pub top_k: Option<usize>,
}

/// Diagnostic search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Matching passages.
    pub results: Vec<PassageDto>,
    /// Number of results.
    pub count: usize,
}

/// Handle diagnostic retrieval with an explicit strategy.
async fn search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let results = state
        .engine
        .retrieve_with(request.strategy, &request.query, request.top_k)
        .await
        .map_err(|e| error_response(&e))?;

    let dtos: Vec<PassageDto> = results.into_iter().map(PassageDto::from).collect();
    let count = dtos.len();

    Ok(Json(SearchResponse {
        results: dtos,
        count,
    }))
}
