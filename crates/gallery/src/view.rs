//! Local view of the gallery and per-item display links.

use std::sync::Arc;

use booth_core::drive;
use booth_core::gallery::{GalleryItem, ItemKind, VideoStatus};
use tokio::sync::watch;

/// Shared, observable list of displayable items.
///
/// Writers replace or edit the list through the sender; readers subscribe to
/// be woken on every change. Last write wins.
pub type GalleryView = Arc<watch::Sender<Vec<GalleryItem>>>;

/// Create an empty view, optionally seeded from a previous session's cache.
pub fn new_view(initial: Vec<GalleryItem>) -> GalleryView {
    Arc::new(watch::Sender::new(initial))
}

/// URLs the gallery UI needs for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub id: String,
    pub kind: ItemKind,
    pub video_status: VideoStatus,
    /// Grid image.
    pub thumbnail_url: String,
    /// Detail view, generated result.
    pub high_res_url: String,
    /// Detail view, original photo (when the item references one).
    pub original_url: Option<String>,
    /// Proxied playback URL once a video exists.
    pub video_url: Option<String>,
    pub qr_link: Option<String>,
}

impl DisplayItem {
    pub fn new(item: &GalleryItem, api_base_url: &str) -> Self {
        let original_url = item
            .original_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| drive::thumbnail_url(id, drive::ORIGINAL_WIDTH));

        let video_file = match item.kind {
            ItemKind::Video => Some(item.id.as_str()),
            _ => item.video_file_id.as_deref().filter(|id| !id.is_empty()),
        };

        Self {
            id: item.id.clone(),
            kind: item.kind,
            video_status: item.video_status,
            thumbnail_url: drive::grid_image_url(item),
            high_res_url: drive::thumbnail_url(&item.id, drive::HIGH_RES_WIDTH),
            original_url,
            video_url: video_file.map(|id| drive::proxied_video_url(api_base_url, id)),
            qr_link: drive::qr_link(item).map(str::to_string),
        }
    }
}
