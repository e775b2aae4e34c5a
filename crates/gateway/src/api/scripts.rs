//! Script endpoints.
//!
//! - `POST /v1/scripts/generate`        — generate from a briefing with the user's prior scripts as context
//! - `POST /v1/scripts/generate-shared` — same against the shared document pool
//! - `POST /v1/scripts`                 — store a script directly (user or shared collection)
//! - `GET  /v1/scripts/:user_id`        — list a user's stored scripts
//! - `GET  /v1/documents`               — list the shared pool

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Local;
use serde::Deserialize;

use sf_context::{group_into_context, serialize_context};
use sf_memory::{user_collection, SHARED_COLLECTION};
use sf_quota::sanitize_user_key;

use crate::runtime::pipeline;
use crate::runtime::search::search_scripts;
use crate::state::AppState;

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub briefing: String,
    pub user_id: String,
    /// Defaults to `context.similarity_threshold` from config.
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    /// Defaults to `context.max_sources` from config.
    #[serde(default)]
    pub max_sources: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSharedRequest {
    pub briefing: String,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub max_sources: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct StoreScriptRequest {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    /// When present, the script lands in the user's collection;
    /// otherwise in the shared pool.
    #[serde(default)]
    pub user_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `POST /v1/scripts/generate`
pub async fn generate_with_user_context(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    if req.briefing.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "briefing must not be empty");
    }

    let key = sanitize_user_key(&req.user_id);
    let collection = user_collection(&key);
    let response = generate_against(&state, &collection, &req.briefing, req.similarity_threshold, req.max_sources).await;
    Json(response).into_response()
}

/// `POST /v1/scripts/generate-shared`
pub async fn generate_with_shared_context(
    State(state): State<AppState>,
    Json(req): Json<GenerateSharedRequest>,
) -> impl IntoResponse {
    if req.briefing.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "briefing must not be empty");
    }

    let response = generate_against(&state, SHARED_COLLECTION, &req.briefing, req.similarity_threshold, req.max_sources).await;
    Json(response).into_response()
}

/// Shared search → assemble → generate sequence for both endpoints.
async fn generate_against(
    state: &AppState,
    collection: &str,
    briefing: &str,
    threshold: Option<f64>,
    max_sources: Option<usize>,
) -> serde_json::Value {
    let threshold = threshold.unwrap_or(state.config.context.similarity_threshold);
    let k = max_sources.unwrap_or(state.config.context.max_sources);

    let outcome = search_scripts(state.memory.as_ref(), collection, briefing, k, threshold).await;
    let bundle = group_into_context(outcome.hits(), k);
    let context_text = serialize_context(&bundle);

    let script = pipeline::generate_script(state, briefing, &context_text).await;

    serde_json::json!({
        "status": "ok",
        "script": script,
        "used_sources": bundle.len(),
        "context_applied": !bundle.is_empty(),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage + listings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `POST /v1/scripts`
pub async fn store_script(
    State(state): State<AppState>,
    Json(req): Json<StoreScriptRequest>,
) -> impl IntoResponse {
    if req.content.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "content must not be empty");
    }

    let title = req
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Script_{}", Local::now().format("%Y%m%d_%H%M%S")));

    let (collection, owner) = match req.user_id.as_deref() {
        Some(uid) => (user_collection(&sanitize_user_key(uid)), Some(uid)),
        None => (SHARED_COLLECTION.to_owned(), None),
    };

    match pipeline::store_chunks(&state, &collection, owner, &req.content, &title).await {
        Ok(doc_id) => Json(serde_json::json!({
            "status": "stored",
            "doc_id": doc_id,
            "title": title,
            "user_id": req.user_id,
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "storing script failed");
            api_error(StatusCode::BAD_GATEWAY, format!("storing script failed: {e}"))
        }
    }
}

/// `GET /v1/scripts/:user_id`
pub async fn list_user_scripts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let key = sanitize_user_key(&user_id);
    list_collection(&state, &user_collection(&key), Some(user_id)).await
}

/// `GET /v1/documents`
pub async fn list_documents(State(state): State<AppState>) -> impl IntoResponse {
    list_collection(&state, SHARED_COLLECTION, None).await
}

/// Fetch up to 100 chunks and collapse them into one row per document
/// (first-seen `doc_id` order, 100-char preview).
async fn list_collection(
    state: &AppState,
    collection: &str,
    user_id: Option<String>,
) -> Response {
    let docs = match state.memory.fetch_all(collection, 100).await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(collection, error = %e, "listing collection failed");
            return api_error(StatusCode::BAD_GATEWAY, format!("listing failed: {e}"));
        }
    };

    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
    let mut entries = Vec::new();
    for doc in &docs {
        if seen.insert(doc.meta.doc_id.as_str()) {
            entries.push(serde_json::json!({
                "id": doc.meta.doc_id,
                "title": if doc.meta.title.is_empty() { "Untitled" } else { &doc.meta.title },
                "date": doc.meta.date,
                "preview": doc.preview(100),
            }));
        }
    }

    Json(serde_json::json!({
        "user_id": user_id,
        "scripts": entries,
        "count": entries.len(),
    }))
    .into_response()
}
