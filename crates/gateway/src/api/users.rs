//! User quota administration endpoints.
//!
//! - `GET /v1/users/:user_id/stats`   — window-corrected usage snapshot
//! - `PUT /v1/users/:user_id/limits`  — override per-user limits
//! - `PUT /v1/users/:user_id/premium` — toggle the premium tier

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use sf_quota::UsageStats;

use crate::state::AppState;

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn stats_json(stats: &UsageStats) -> serde_json::Value {
    serde_json::json!({
        "user_id": stats.user_id,
        "daily_usage": format!("{}/{}", stats.daily_used, stats.daily_limit),
        "monthly_usage": format!("{}/{}", stats.monthly_used, stats.monthly_limit),
        "daily_remaining": stats.daily_remaining(),
        "monthly_remaining": stats.monthly_remaining(),
        "is_premium": stats.is_premium,
        "created_at": stats.created_at,
        "last_activity": stats.last_activity,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handlers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `GET /v1/users/:user_id/stats`
pub async fn get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let stats = state.quota.stats(&user_id);
    Json(stats_json(&stats))
}

#[derive(Debug, Deserialize)]
pub struct SetLimitsRequest {
    #[serde(default)]
    pub daily_limit: Option<u32>,
    #[serde(default)]
    pub monthly_limit: Option<u32>,
}

/// `PUT /v1/users/:user_id/limits`
pub async fn set_limits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetLimitsRequest>,
) -> impl IntoResponse {
    if req.daily_limit.is_none() && req.monthly_limit.is_none() {
        return api_error(
            StatusCode::BAD_REQUEST,
            "provide daily_limit and/or monthly_limit",
        );
    }

    state
        .quota
        .set_limits(&user_id, req.daily_limit, req.monthly_limit);
    tracing::info!(
        user = %user_id,
        daily = ?req.daily_limit,
        monthly = ?req.monthly_limit,
        "limits updated"
    );

    let stats = state.quota.stats(&user_id);
    Json(stats_json(&stats)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SetPremiumRequest {
    pub is_premium: bool,
}

/// `PUT /v1/users/:user_id/premium`
pub async fn set_premium(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetPremiumRequest>,
) -> impl IntoResponse {
    state.quota.set_premium(&user_id, req.is_premium);
    tracing::info!(user = %user_id, premium = req.is_premium, "premium flag updated");

    let stats = state.quota.stats(&user_id);
    Json(stats_json(&stats))
}
