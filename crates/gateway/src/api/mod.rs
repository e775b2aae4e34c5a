pub mod auth;
pub mod health;
pub mod scripts;
pub mod users;
pub mod webhook;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (the messaging webhook and health
/// probe) and **protected** (gated behind the bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        // Messaging webhook (verification handshake + inbound events)
        .route("/webhook", get(webhook::verify))
        .route("/webhook", post(webhook::receive))
        // Liveness / collaborator readiness
        .route("/health", get(health::health));

    let protected = Router::new()
        // Script generation
        .route("/v1/scripts/generate", post(scripts::generate_with_user_context))
        .route("/v1/scripts/generate-shared", post(scripts::generate_with_shared_context))
        // Direct script storage + listings
        .route("/v1/scripts", post(scripts::store_script))
        .route("/v1/scripts/:user_id", get(scripts::list_user_scripts))
        .route("/v1/documents", get(scripts::list_documents))
        // User quota administration
        .route("/v1/users/:user_id/stats", get(users::get_stats))
        .route("/v1/users/:user_id/limits", put(users::set_limits))
        .route("/v1/users/:user_id/premium", put(users::set_premium))
        // Apply API auth middleware to all protected routes.
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}
