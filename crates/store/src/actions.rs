//! Write-side request bodies.
//!
//! Every `POST` to the store carries `{ "action": "<name>", ...fields }`.

use booth_core::gallery::VideoStatus;
use booth_core::generation::Resolution;
use serde::Serialize;

/// `updateVideoStatus` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatusUpdate {
    pub photo_id: String,
    pub status: VideoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl VideoStatusUpdate {
    /// Bare status change for `photo_id`.
    pub fn new(photo_id: impl Into<String>, status: VideoStatus) -> Self {
        Self {
            photo_id: photo_id.into(),
            status,
            task_id: None,
            session_folder_id: None,
            prompt: None,
            resolution: None,
            model: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }
}

/// `uploadGeneratedVideo` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideoUpload {
    /// `data:video/mp4;base64,...`
    pub image: String,
    pub folder_id: Option<String>,
    pub related_photo_id: String,
    /// `false` so the store updates the photo row rather than adding one.
    pub skip_gallery: bool,
}

/// Tagged `POST` body.
#[derive(Debug, Serialize)]
#[serde(tag = "action")]
pub enum StoreAction<'a> {
    #[serde(rename = "updateVideoStatus")]
    UpdateVideoStatus(&'a VideoStatusUpdate),
    #[serde(rename = "uploadGeneratedVideo")]
    UploadGeneratedVideo(&'a GeneratedVideoUpload),
    #[serde(rename = "deletePhoto")]
    DeletePhoto { id: &'a str, pin: &'a str },
    #[serde(rename = "deleteAllPhotos")]
    DeleteAllPhotos { pin: &'a str },
}

impl StoreAction<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            StoreAction::UpdateVideoStatus(_) => "updateVideoStatus",
            StoreAction::UploadGeneratedVideo(_) => "uploadGeneratedVideo",
            StoreAction::DeletePhoto { .. } => "deletePhoto",
            StoreAction::DeleteAllPhotos { .. } => "deleteAllPhotos",
        }
    }
}
