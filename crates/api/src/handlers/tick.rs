//! Handler for `/api/video/tick`: one dispatch cycle per request.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::engine::dispatcher::DispatchReport;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TickResponse {
    pub ok: bool,
    pub report: DispatchReport,
}

/// GET /api/video/tick
///
/// The cycle runs on its own task. A timed-out or disconnected request
/// stops waiting for it but never interrupts it between starting a job and
/// recording its task id.
pub async fn run_tick(State(state): State<AppState>) -> AppResult<Json<TickResponse>> {
    let dispatcher = Arc::clone(state.dispatcher()?);
    let report = tokio::spawn(async move { dispatcher.run_cycle().await })
        .await
        .map_err(|e| AppError::InternalError(format!("Dispatch cycle task failed: {e}")))??;
    Ok(Json(TickResponse { ok: true, report }))
}
