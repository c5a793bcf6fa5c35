//! Remote operations the gallery client performs.
//!
//! Store reads and PIN-gated mutations go straight to the Apps Script store;
//! video requests and dispatcher ticks go through the booth API server.

use async_trait::async_trait;
use booth_core::gallery::GalleryItem;
use booth_store::{AppsScriptStore, GalleryAdmin, GalleryStore};
use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

/// Body of `POST /api/video/start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVideoRequest {
    pub drive_file_id: String,
    pub session_folder_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// `{ "error": ... }` body of a failed API call.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

#[async_trait]
pub trait GalleryBackend: Send + Sync {
    /// All items, optionally scoped to one event.
    async fn fetch_gallery(&self, event_id: Option<&str>) -> Result<Vec<GalleryItem>, GalleryError>;

    /// Fire one dispatcher cycle.
    async fn tick(&self) -> Result<(), GalleryError>;

    async fn delete_photo(&self, id: &str, pin: &str) -> Result<(), GalleryError>;

    async fn delete_all_photos(&self, pin: &str) -> Result<(), GalleryError>;

    /// Queue a photo for video generation.
    async fn start_video(&self, request: &StartVideoRequest) -> Result<(), GalleryError>;

    /// Original photo as base64; `None` when the store has none.
    async fn fetch_image_base64(&self, file_id: &str) -> Result<Option<String>, GalleryError>;
}

/// [`GalleryBackend`] over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    api_base_url: String,
    store: AppsScriptStore,
}

impl HttpBackend {
    pub fn new(api_base_url: &str, store_base_url: String) -> Self {
        let client = reqwest::Client::new();
        Self {
            store: AppsScriptStore::with_client(client.clone(), store_base_url),
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

/// Map a non-2xx API response to its `error` message, or the status code.
async fn api_failure(response: reqwest::Response) -> GalleryError {
    let status = response.status().as_u16();
    match response.json::<ApiErrorBody>().await {
        Ok(ApiErrorBody { error: Some(msg) }) => GalleryError::Backend(msg),
        _ => GalleryError::Backend(format!("Request failed with status {status}")),
    }
}

#[async_trait]
impl GalleryBackend for HttpBackend {
    async fn fetch_gallery(&self, event_id: Option<&str>) -> Result<Vec<GalleryItem>, GalleryError> {
        Ok(self.store.list_items(event_id).await?)
    }

    async fn tick(&self) -> Result<(), GalleryError> {
        let response = self.client.get(self.api_url("/api/video/tick")).send().await?;
        if !response.status().is_success() {
            return Err(api_failure(response).await);
        }
        Ok(())
    }

    async fn delete_photo(&self, id: &str, pin: &str) -> Result<(), GalleryError> {
        Ok(self.store.delete_photo(id, pin).await?)
    }

    async fn delete_all_photos(&self, pin: &str) -> Result<(), GalleryError> {
        Ok(self.store.delete_all_photos(pin).await?)
    }

    async fn start_video(&self, request: &StartVideoRequest) -> Result<(), GalleryError> {
        let response = self
            .client
            .post(self.api_url("/api/video/start"))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_failure(response).await);
        }
        Ok(())
    }

    async fn fetch_image_base64(&self, file_id: &str) -> Result<Option<String>, GalleryError> {
        Ok(self.store.fetch_image_base64(file_id).await?)
    }
}
