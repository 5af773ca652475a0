use std::path::Path;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::application::DEFAULT_TOP_K;
use crate::domain::{IngestSummary, ResponseStatus, SourceAttribution};
use crate::infrastructure::SERVICE_NAME;

/// Smallest accepted value for `n_results`.
const MIN_RESULTS: i64 = 1;
/// Largest accepted value for `n_results`.
const MAX_RESULTS: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Kept as raw JSON: anything that is not an integer in range falls back
    /// to the default instead of failing the request.
    #[serde(default)]
    pub n_results: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub sources: Vec<SourceAttribution>,
    pub status: ResponseStatus,
    pub timestamp: String,
    pub n_results_requested: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub system: String,
    pub components: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub document_processor: String,
    pub rag_pipeline: String,
    pub vector_database: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn clamp_n_results(raw: Option<&Value>) -> usize {
    raw.and_then(Value::as_i64)
        .filter(|n| (MIN_RESULTS..=MAX_RESULTS).contains(n))
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_TOP_K)
}

/// POST /api/chatbot/query
pub async fn query_chatbot(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let query = request
        .query
        .ok_or_else(|| ApiError::bad_request("Missing required field: query"))?;
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query cannot be empty"));
    }

    let n_results = clamp_n_results(request.n_results.as_ref());

    let outcome = state.pipeline.query(&query, n_results).await.map_err(|e| {
        ApiError::internal_with_details(
            "Internal server error while processing query",
            e.to_string(),
        )
    })?;

    Ok(Json(QueryResponse {
        response: outcome.response,
        sources: outcome.sources,
        status: outcome.status,
        timestamp: Utc::now().to_rfc3339(),
        n_results_requested: n_results,
    }))
}

/// GET /api/chatbot/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let document_processor = if state.processor.is_some() {
        "loaded"
    } else {
        "not_loaded"
    };
    let rag_pipeline = if state.pipeline.is_ready() {
        "loaded"
    } else {
        "mock_mode"
    };

    let vector_database = match &state.vector_store {
        Some(store) => match store.count().await {
            Ok(Some(count)) => format!("ready ({count} documents)"),
            Ok(None) => "no_collections".to_string(),
            Err(e) => format!("error: {e}"),
        },
        None => "error: vector store not initialized".to_string(),
    };

    Json(StatusResponse {
        system: "operational".to_string(),
        components: ComponentStatus {
            document_processor: document_processor.to_string(),
            rag_pipeline: rag_pipeline.to_string(),
            vector_database,
        },
    })
}

/// POST /api/chatbot/process-document
pub async fn process_document(
    State(state): State<AppState>,
) -> Result<Json<IngestSummary>, ApiError> {
    let processor = state
        .processor
        .as_ref()
        .ok_or_else(|| ApiError::internal("Document processor not available"))?;

    let path = Path::new(&state.config.document.path);
    if !path.exists() {
        return Err(ApiError::not_found("DAFMAN PDF file not found"));
    }

    let summary = processor
        .process_document(path)
        .await
        .map_err(|e| ApiError::internal_with_details("Failed to process document", e.to_string()))?;

    Ok(Json(summary))
}

/// GET /api/chatbot/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Catch-all for unknown paths, wired as the router fallback.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}
