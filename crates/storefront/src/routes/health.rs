//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Calls the backend directly, bypassing the query cache, and returns 503
/// Service Unavailable if it cannot be reached.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let actor = state.actor(None);
    match actor.backend().get_all_products().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
