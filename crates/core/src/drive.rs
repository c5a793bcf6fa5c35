//! Google Drive URL helpers.
//!
//! Gallery rows only carry Drive file ids; these helpers build the public
//! URLs used for thumbnails, downloads and proxied video playback.

use url::form_urlencoded;

use crate::gallery::GalleryItem;

const DRIVE_HOST: &str = "https://drive.google.com";

/// Thumbnail width used by the gallery grid.
pub const GRID_THUMB_WIDTH: u32 = 600;
/// Width of the "result" preview in the detail view.
pub const HIGH_RES_WIDTH: u32 = 1200;
/// Width of the "original" preview in the detail view.
pub const ORIGINAL_WIDTH: u32 = 1000;

/// Host whose image URLs expire and must be replaced by a Drive thumbnail.
const EPHEMERAL_IMAGE_HOST: &str = "lh3.googleusercontent.com";

/// Direct download URL for a Drive file.
pub fn download_url(file_id: &str) -> String {
    format!("{DRIVE_HOST}/uc?export=download&id={file_id}")
}

/// Drive thumbnail URL at the given width.
pub fn thumbnail_url(file_id: &str, width: u32) -> String {
    format!("{DRIVE_HOST}/thumbnail?id={file_id}&sz=w{width}")
}

/// Image shown in the gallery grid for `item`.
///
/// Uses the row's own `imageUrl` when it is an http(s) URL on a stable host,
/// otherwise a Drive thumbnail.
pub fn grid_image_url(item: &GalleryItem) -> String {
    match item.image_url.as_deref() {
        Some(url) if url.starts_with("http") && !url.contains(EPHEMERAL_IMAGE_HOST) => {
            url.to_string()
        }
        _ => thumbnail_url(&item.id, GRID_THUMB_WIDTH),
    }
}

/// Playback URL routed through the stream proxy so range requests work.
pub fn proxied_video_url(api_base: &str, file_id: &str) -> String {
    let target: String = form_urlencoded::byte_serialize(download_url(file_id).as_bytes()).collect();
    format!("{}/api/video/proxy?url={target}", api_base.trim_end_matches('/'))
}

/// Link encoded in the share QR code.
pub fn qr_link(item: &GalleryItem) -> Option<&str> {
    item.session_folder_url
        .as_deref()
        .or(item.download_url.as_deref())
}
