use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the dispatcher's environment is complete.
    pub dispatcher_configured: bool,
    /// Period of the in-process ticker, `null` when it is not running.
    pub background_tick_secs: Option<u64>,
}

/// GET /health -- liveness plus dispatcher configuration state.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        dispatcher_configured: state.dispatcher.is_ok(),
        background_tick_secs: state
            .config
            .tick_interval_secs
            .filter(|_| state.dispatcher.is_ok()),
    })
}

/// Mount health check routes (root level, not under `/api/video`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
