//! Client for the spreadsheet-backed gallery store.
//!
//! The store is an Apps Script web app fronting a Google Sheet (rows) and a
//! Drive folder tree (files). It is treated as an opaque HTTP service: a
//! `GET ?action=...` read side and a `POST` write side taking JSON bodies
//! with an `action` discriminator.
//!
//! Two traits split the surface by consumer:
//!
//! - [`GalleryStore`] -- what the queue dispatcher needs (list rows, write
//!   status, upload generated videos).
//! - [`GalleryAdmin`] -- user-initiated mutations from the gallery client.
//!
//! [`AppsScriptStore`] implements both over HTTP.

pub mod actions;
pub mod apps_script;

use async_trait::async_trait;
use booth_core::gallery::GalleryItem;

pub use actions::{GeneratedVideoUpload, StoreAction, VideoStatusUpdate};
pub use apps_script::AppsScriptStore;

/// Errors from the store client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Store API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The store answered `{ "ok": false }`.
    #[error("Store rejected request: {0}")]
    Rejected(String),

    /// A request or response body could not be (de)serialized.
    #[error("Invalid store payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Row access used by the queue dispatcher.
#[async_trait]
pub trait GalleryStore: Send + Sync {
    /// Fetch every row, optionally scoped to one event/session.
    async fn list_items(&self, event_id: Option<&str>) -> Result<Vec<GalleryItem>, StoreError>;

    /// Write a row's video status (and task id / generation parameters).
    async fn update_video_status(&self, update: &VideoStatusUpdate) -> Result<(), StoreError>;

    /// Upload a finished video into the session folder and link it to its
    /// source photo row.
    async fn upload_generated_video(&self, upload: &GeneratedVideoUpload) -> Result<(), StoreError>;
}

/// PIN-gated mutations and media reads issued by the gallery client.
#[async_trait]
pub trait GalleryAdmin: Send + Sync {
    async fn delete_photo(&self, id: &str, pin: &str) -> Result<(), StoreError>;

    /// Clear every gallery row. Files stay in Drive.
    async fn delete_all_photos(&self, pin: &str) -> Result<(), StoreError>;

    /// Fetch a stored image as base64 (or a data URL). `None` when the
    /// store has no image for `file_id`.
    async fn fetch_image_base64(&self, file_id: &str) -> Result<Option<String>, StoreError>;
}
