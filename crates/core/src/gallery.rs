//! Gallery item model.
//!
//! Items are owned by the external store and arrive as camelCase JSON rows.
//! Every field except `id` is optional on the wire; unknown fields are
//! ignored so that new spreadsheet columns do not break deserialization.
//! Text columns go through [`cell`], so numeric cells decode as strings.

use serde::{Deserialize, Deserializer, Serialize};

use crate::cell;

// ---------------------------------------------------------------------------
// Status values
// ---------------------------------------------------------------------------

pub const STATUS_QUEUED: &str = "queued";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_DONE: &str = "done";
pub const STATUS_FAILED: &str = "failed";

/// Video generation state of a gallery row.
///
/// `Idle` covers an absent, empty or unrecognized `videoStatus` cell.
/// Matching is exact: `" queued"` or `"Queued"` is `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "Option<String>")]
pub enum VideoStatus {
    #[default]
    Idle,
    Queued,
    Processing,
    Done,
    Failed,
}

impl VideoStatus {
    /// Wire value, or `None` for [`VideoStatus::Idle`].
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            VideoStatus::Idle => None,
            VideoStatus::Queued => Some(STATUS_QUEUED),
            VideoStatus::Processing => Some(STATUS_PROCESSING),
            VideoStatus::Done => Some(STATUS_DONE),
            VideoStatus::Failed => Some(STATUS_FAILED),
        }
    }

    /// `true` while a generation job is queued or running for the row.
    pub fn is_active(self) -> bool {
        matches!(self, VideoStatus::Queued | VideoStatus::Processing)
    }
}

impl From<Option<String>> for VideoStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some(STATUS_QUEUED) => VideoStatus::Queued,
            Some(STATUS_PROCESSING) => VideoStatus::Processing,
            Some(STATUS_DONE) => VideoStatus::Done,
            Some(STATUS_FAILED) => VideoStatus::Failed,
            _ => VideoStatus::Idle,
        }
    }
}

impl<'de> Deserialize<'de> for VideoStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        cell::optional(deserializer).map(VideoStatus::from)
    }
}

impl From<VideoStatus> for Option<String> {
    fn from(status: VideoStatus) -> Self {
        status.as_str().map(str::to_string)
    }
}

/// Record classification (`type` column). A missing cell is a photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Photo,
    Video,
    Other,
}

impl<'de> Deserialize<'de> for ItemKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match cell::optional(deserializer)?.as_deref() {
            None | Some("photo") => ItemKind::Photo,
            Some("video") => ItemKind::Video,
            Some(_) => ItemKind::Other,
        })
    }
}

// ---------------------------------------------------------------------------
// GalleryItem
// ---------------------------------------------------------------------------

/// A single row of the external gallery store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(deserialize_with = "cell::required")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub video_status: VideoStatus,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_task_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_file_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_folder_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_folder_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_prompt: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_resolution: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_model: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub concept_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "cell::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
}

impl GalleryItem {
    /// Task id assigned by the generation API, ignoring blank cells.
    pub fn task_id(&self) -> Option<&str> {
        non_blank(self.video_task_id.as_deref())
    }

    /// Session folder id, ignoring blank cells.
    pub fn session_folder(&self) -> Option<&str> {
        non_blank(self.session_folder_id.as_deref())
    }

    /// Whether the row belongs in the rendered gallery.
    ///
    /// Video rows stay hidden until their generation is `done`; photo rows
    /// are always shown.
    pub fn is_displayable(&self) -> bool {
        self.kind != ItemKind::Video || self.video_status == VideoStatus::Done
    }
}

/// Keep only the rows that belong in the rendered gallery, preserving order.
pub fn displayable_items(items: Vec<GalleryItem>) -> Vec<GalleryItem> {
    items.into_iter().filter(GalleryItem::is_displayable).collect()
}

/// Treat empty or whitespace-only spreadsheet cells as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
