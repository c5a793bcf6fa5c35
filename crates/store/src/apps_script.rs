//! HTTP implementation of the store traits against an Apps Script web app.
//!
//! Apps Script rejects CORS-preflighted `application/json` POSTs, so write
//! requests declare `text/plain` while carrying a JSON body.

use async_trait::async_trait;
use booth_core::gallery::GalleryItem;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::actions::{GeneratedVideoUpload, StoreAction, VideoStatusUpdate};
use crate::{GalleryAdmin, GalleryStore, StoreError};

const TEXT_PLAIN: &str = "text/plain;charset=utf-8";

/// `GET ?action=gallery` response. Rows are decoded one at a time so a
/// single malformed row cannot hide the rest.
#[derive(Debug, Deserialize)]
struct GalleryResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl GalleryResponse {
    fn into_items(self) -> Vec<GalleryItem> {
        self.items
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping malformed gallery row");
                    None
                }
            })
            .collect()
    }
}

/// Generic `{ ok, error }` acknowledgement returned by write actions.
#[derive(Debug, Default, Deserialize)]
struct Ack {
    ok: Option<bool>,
    error: Option<String>,
}

/// `GET ?action=getImage` response.
#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    ok: bool,
    image: Option<String>,
    error: Option<String>,
}

/// HTTP client for one Apps Script deployment.
#[derive(Clone)]
pub struct AppsScriptStore {
    client: reqwest::Client,
    base_url: String,
}

impl AppsScriptStore {
    /// * `base_url` - Deployment URL, e.g. `https://script.google.com/macros/s/<id>/exec`.
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one write action and interpret the acknowledgement.
    async fn post_action(&self, action: &StoreAction<'_>) -> Result<(), StoreError> {
        let body = serde_json::to_string(action)?;
        tracing::debug!(action = action.name(), "Posting store action");

        let response = self
            .client
            .post(&self.base_url)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .body(body)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let text = response.text().await?;

        // Older deployments answer with plain text; only an explicit
        // `ok: false` counts as a rejection.
        let ack: Ack = serde_json::from_str(&text).unwrap_or_default();
        if ack.ok == Some(false) {
            return Err(StoreError::Rejected(
                ack.error.unwrap_or_else(|| format!("{} failed", action.name())),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl GalleryStore for AppsScriptStore {
    async fn list_items(&self, event_id: Option<&str>) -> Result<Vec<GalleryItem>, StoreError> {
        // Cache buster: Apps Script responses are otherwise cached by Google's edge.
        let t = chrono::Utc::now().timestamp_millis().to_string();
        let mut query = vec![("action", "gallery"), ("t", t.as_str())];
        if let Some(event_id) = event_id {
            query.push(("eventId", event_id));
        }

        let response = self.client.get(&self.base_url).query(&query).send().await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        let gallery: GalleryResponse = serde_json::from_slice(&bytes)?;
        Ok(gallery.into_items())
    }

    async fn update_video_status(&self, update: &VideoStatusUpdate) -> Result<(), StoreError> {
        self.post_action(&StoreAction::UpdateVideoStatus(update)).await
    }

    async fn upload_generated_video(&self, upload: &GeneratedVideoUpload) -> Result<(), StoreError> {
        self.post_action(&StoreAction::UploadGeneratedVideo(upload)).await
    }
}

#[async_trait]
impl GalleryAdmin for AppsScriptStore {
    async fn delete_photo(&self, id: &str, pin: &str) -> Result<(), StoreError> {
        self.post_action(&StoreAction::DeletePhoto { id, pin }).await
    }

    async fn delete_all_photos(&self, pin: &str) -> Result<(), StoreError> {
        self.post_action(&StoreAction::DeleteAllPhotos { pin }).await
    }

    async fn fetch_image_base64(&self, file_id: &str) -> Result<Option<String>, StoreError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", "getImage"), ("id", file_id)])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        let image: ImageResponse = serde_json::from_slice(&bytes)?;

        if !image.ok {
            if let Some(error) = image.error {
                tracing::warn!(file_id, error = %error, "Store could not load image");
            }
            return Ok(None);
        }
        Ok(image.image.filter(|data| !data.is_empty()))
    }
}

/// Return the response unchanged on 2xx, otherwise an
/// [`StoreError::ApiError`] with the status and body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(StoreError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
