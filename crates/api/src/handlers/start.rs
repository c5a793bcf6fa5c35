//! Handler for `/api/video/start`: queue a gallery photo for generation.
//!
//! Only writes `queued` to the store. The dispatcher admits the row on a
//! later tick.

use axum::extract::State;
use axum::Json;
use booth_core::error::CoreError;
use booth_core::gallery::{non_blank, VideoStatus};
use booth_core::generation::Resolution;
use booth_store::VideoStatusUpdate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVideoRequest {
    pub drive_file_id: Option<String>,
    pub session_folder_id: Option<String>,
    pub prompt: Option<String>,
    pub resolution: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartVideoResponse {
    pub ok: bool,
    pub id: String,
    pub status: &'static str,
}

fn required(value: Option<&str>, field: &str) -> AppResult<String> {
    non_blank(value)
        .map(str::to_string)
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")).into())
}

fn parse_resolution(raw: Option<&str>) -> AppResult<Option<Resolution>> {
    match non_blank(raw) {
        None => Ok(None),
        Some("720p") => Ok(Some(Resolution::P720)),
        Some("480p") => Ok(Some(Resolution::P480)),
        Some(other) => Err(CoreError::Validation(format!(
            "resolution must be 720p or 480p, got {other}"
        ))
        .into()),
    }
}

/// POST /api/video/start
pub async fn start_video(
    State(state): State<AppState>,
    Json(input): Json<StartVideoRequest>,
) -> AppResult<Json<StartVideoResponse>> {
    let photo_id = required(input.drive_file_id.as_deref(), "driveFileId")?;
    let session_folder_id = required(input.session_folder_id.as_deref(), "sessionFolderId")?;
    let resolution = parse_resolution(input.resolution.as_deref())?;

    let store = state.store()?;

    let items = store.list_items(None).await?;
    let item = items
        .iter()
        .find(|i| i.id == photo_id)
        .ok_or_else(|| CoreError::NotFound {
            entity: "Gallery item",
            id: photo_id.clone(),
        })?;
    if item.video_status.is_active() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Item {photo_id} is already {}",
            item.video_status.as_str().unwrap_or_default()
        ))));
    }

    let update = VideoStatusUpdate {
        session_folder_id: Some(session_folder_id),
        prompt: non_blank(input.prompt.as_deref()).map(str::to_string),
        resolution,
        model: non_blank(input.model.as_deref()).map(str::to_string),
        ..VideoStatusUpdate::new(&photo_id, VideoStatus::Queued)
    };
    store.update_video_status(&update).await?;

    tracing::info!(photo_id = %photo_id, "Video generation queued");

    Ok(Json(StartVideoResponse {
        ok: true,
        id: photo_id,
        status: "queued",
    }))
}
