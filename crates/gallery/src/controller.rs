//! User-initiated gallery mutations.
//!
//! Deletes are optimistic: the view changes first and is restored from a
//! snapshot if the store refuses. Clears are gated locally on the admin PIN
//! before anything is sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use booth_core::gallery::{non_blank, GalleryItem, VideoStatus};

use crate::backend::{GalleryBackend, StartVideoRequest};
use crate::error::GalleryError;
use crate::view::GalleryView;

/// Session folder a regenerated photo should be filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRef {
    pub id: String,
    pub url: String,
}

/// Everything the booth needs to re-run a concept on an original photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerationRequest {
    /// Original photo, base64 or data URL as returned by the store.
    pub image: String,
    pub concept: String,
    pub use_ultra_quality: bool,
    pub session: Option<SessionRef>,
}

pub struct GalleryController {
    backend: Arc<dyn GalleryBackend>,
    view: GalleryView,
    admin_pin: Option<String>,
    video_prompt: Option<String>,
    regenerating: AtomicBool,
}

impl GalleryController {
    pub fn new(
        backend: Arc<dyn GalleryBackend>,
        view: GalleryView,
        admin_pin: Option<String>,
        video_prompt: Option<String>,
    ) -> Self {
        Self {
            backend,
            view,
            admin_pin,
            video_prompt,
            regenerating: AtomicBool::new(false),
        }
    }

    fn find(&self, id: &str) -> Result<GalleryItem, GalleryError> {
        self.view
            .borrow()
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))
    }

    /// Remove `id` locally, then in the store. Restores the previous list
    /// when the store refuses.
    pub async fn delete_item(&self, id: &str) -> Result<(), GalleryError> {
        let snapshot = self.view.borrow().clone();
        if !snapshot.iter().any(|i| i.id == id) {
            return Err(GalleryError::NotFound(id.to_string()));
        }

        self.view.send_modify(|items| items.retain(|i| i.id != id));

        let pin = self.admin_pin.as_deref().unwrap_or(crate::config::DEFAULT_DELETE_PIN);
        match self.backend.delete_photo(id, pin).await {
            Ok(()) => {
                tracing::info!(item_id = %id, "Photo deleted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(item_id = %id, error = %e, "Delete failed, restoring item");
                self.view.send_replace(snapshot);
                Err(e)
            }
        }
    }

    /// Clear the whole gallery. `entered_pin` must equal the configured admin
    /// PIN exactly; with no PIN configured nothing can be cleared.
    pub async fn clear_all(&self, entered_pin: &str) -> Result<(), GalleryError> {
        if self.admin_pin.as_deref() != Some(entered_pin) {
            return Err(GalleryError::InvalidPin);
        }

        self.backend.delete_all_photos(entered_pin).await?;
        self.view.send_replace(Vec::new());
        tracing::info!("Gallery cleared");
        Ok(())
    }

    /// Ask the server to queue a video for `id`. `prompt` overrides the
    /// configured video prompt.
    pub async fn request_video(&self, id: &str, prompt: Option<&str>) -> Result<(), GalleryError> {
        let item = self.find(id)?;
        let session_folder_id = non_blank(item.session_folder_id.as_deref())
            .ok_or_else(|| GalleryError::MissingSession(id.to_string()))?
            .to_string();

        let request = StartVideoRequest {
            drive_file_id: item.id.clone(),
            session_folder_id,
            prompt: prompt
                .or(self.video_prompt.as_deref())
                .map(str::to_string),
        };
        self.backend.start_video(&request).await?;

        self.view.send_modify(|items| {
            if let Some(item) = items.iter_mut().find(|i| i.id == id) {
                item.video_status = VideoStatus::Queued;
            }
        });
        tracing::info!(item_id = %id, "Video requested");
        Ok(())
    }

    /// Fetch the original photo behind `id` for a new concept run.
    ///
    /// Only one regeneration may be in flight. The flag is cleared on
    /// failure; after a successful hand-off the caller clears it with
    /// [`finish_regeneration`](Self::finish_regeneration).
    pub async fn request_regeneration(
        &self,
        id: &str,
        concept: &str,
        use_ultra_quality: bool,
    ) -> Result<RegenerationRequest, GalleryError> {
        let item = self.find(id)?;
        let original_id = non_blank(item.original_id.as_deref())
            .ok_or_else(|| GalleryError::MissingOriginal(id.to_string()))?
            .to_string();

        if self.regenerating.swap(true, Ordering::SeqCst) {
            return Err(GalleryError::Busy);
        }

        let image = match self.backend.fetch_image_base64(&original_id).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                self.finish_regeneration();
                return Err(GalleryError::Backend(format!(
                    "Original photo {original_id} could not be fetched"
                )));
            }
            Err(e) => {
                self.finish_regeneration();
                return Err(e);
            }
        };

        let session = match (
            non_blank(item.session_folder_id.as_deref()),
            non_blank(item.session_folder_url.as_deref()),
        ) {
            (Some(id), Some(url)) => Some(SessionRef {
                id: id.to_string(),
                url: url.to_string(),
            }),
            _ => None,
        };

        Ok(RegenerationRequest {
            image,
            concept: concept.to_string(),
            use_ultra_quality,
            session,
        })
    }

    pub fn is_regenerating(&self) -> bool {
        self.regenerating.load(Ordering::SeqCst)
    }

    pub fn finish_regeneration(&self) {
        self.regenerating.store(false, Ordering::SeqCst);
    }
}
