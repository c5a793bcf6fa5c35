#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use booth_core::gallery::{GalleryItem, ItemKind, VideoStatus};
use booth_gallery::{GalleryBackend, GalleryError, StartVideoRequest};

/// Scripted backend recording every call.
#[derive(Default)]
pub struct FakeBackend {
    /// Items per event id (`None` = unscoped).
    pub items: Mutex<Vec<(Option<String>, Vec<GalleryItem>)>>,
    pub fetches: Mutex<Vec<Option<String>>>,
    pub ticks: AtomicUsize,
    pub deletes: Mutex<Vec<(String, String)>>,
    pub clears: Mutex<Vec<String>>,
    pub starts: Mutex<Vec<StartVideoRequest>>,
    pub images: Mutex<Vec<(String, String)>>,
    /// Message returned by every mutation when set.
    pub reject_with: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_items(&self, event_id: Option<&str>, items: Vec<GalleryItem>) {
        let mut all = self.items.lock().unwrap();
        all.retain(|(e, _)| e.as_deref() != event_id);
        all.push((event_id.map(str::to_string), items));
    }

    pub fn reject(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), GalleryError> {
        match self.reject_with.lock().unwrap().clone() {
            Some(msg) => Err(GalleryError::Backend(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GalleryBackend for FakeBackend {
    async fn fetch_gallery(&self, event_id: Option<&str>) -> Result<Vec<GalleryItem>, GalleryError> {
        self.fetches.lock().unwrap().push(event_id.map(str::to_string));
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|(e, _)| e.as_deref() == event_id)
            .map(|(_, items)| items.clone())
            .unwrap_or_default())
    }

    async fn tick(&self) -> Result<(), GalleryError> {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_photo(&self, id: &str, pin: &str) -> Result<(), GalleryError> {
        self.deletes.lock().unwrap().push((id.to_string(), pin.to_string()));
        self.check()
    }

    async fn delete_all_photos(&self, pin: &str) -> Result<(), GalleryError> {
        self.clears.lock().unwrap().push(pin.to_string());
        self.check()
    }

    async fn start_video(&self, request: &StartVideoRequest) -> Result<(), GalleryError> {
        self.starts.lock().unwrap().push(request.clone());
        self.check()
    }

    async fn fetch_image_base64(&self, file_id: &str) -> Result<Option<String>, GalleryError> {
        self.check()?;
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == file_id)
            .map(|(_, image)| image.clone()))
    }
}

pub fn photo(id: &str) -> GalleryItem {
    GalleryItem {
        id: id.to_string(),
        kind: ItemKind::Photo,
        ..Default::default()
    }
}

pub fn video(id: &str, status: VideoStatus) -> GalleryItem {
    GalleryItem {
        id: id.to_string(),
        kind: ItemKind::Video,
        video_status: status,
        ..Default::default()
    }
}

pub fn ids(items: &[GalleryItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}
