//! Health endpoint.
//!
//! - `GET /health` — liveness plus a best-effort reachability check of
//!   the similarity-search service.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let memory_status = match state.memory.health().await {
        Ok(_) => "up",
        Err(e) => {
            tracing::debug!(error = %e, "memory health probe failed");
            "down"
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "memory": memory_status,
    }))
}
