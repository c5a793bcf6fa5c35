use std::sync::Arc;

use booth_store::GalleryStore;

use crate::config::{ConfigError, ServerConfig};
use crate::engine::dispatcher::QueueDispatcher;
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Upstream dependencies are resolved once at startup; when their
/// configuration is missing the error is kept and returned by the routes
/// that need them, so the rest of the server stays up.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Shared HTTP client for proxied requests.
    pub http: reqwest::Client,
    /// Queue dispatcher driving `/api/video/tick`.
    pub dispatcher: Result<Arc<QueueDispatcher>, ConfigError>,
    /// Gallery store used by `/api/video/start`.
    pub store: Result<Arc<dyn GalleryStore>, ConfigError>,
}

impl AppState {
    pub fn dispatcher(&self) -> AppResult<&Arc<QueueDispatcher>> {
        self.dispatcher.as_ref().map_err(|e| e.clone().into())
    }

    pub fn store(&self) -> AppResult<&Arc<dyn GalleryStore>> {
        self.store.as_ref().map_err(|e| e.clone().into())
    }
}
