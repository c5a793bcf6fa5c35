//! Video generation queue dispatcher.
//!
//! One [`QueueDispatcher::run_cycle`] call performs a single unit of queue
//! work against the external store:
//!
//! 1. **Maintenance** -- poll every `processing` row that has a task id and
//!    write back terminal results (upload on success, `failed` on failure).
//! 2. **Admission** -- start up to `MAX_CONCURRENT_JOBS - processing` queued
//!    rows, in store order, and mark them `processing`.
//!
//! The dispatcher keeps no queue state of its own. The processing count is
//! recomputed from the store on every cycle, so a restart between cycles
//! loses nothing. Both passes are sequential: at most one upstream call is
//! outstanding at a time.

use std::sync::Arc;

use base64::Engine;
use booth_core::gallery::{GalleryItem, VideoStatus};
use booth_core::generation::{available_slots, GenerationParams};
use booth_seedance::{
    CreateTaskRequest, GenerationApi, SeedanceApi, SeedanceApiError, TaskSnapshot, TaskStatus,
};
use booth_store::{
    AppsScriptStore, GalleryStore, GeneratedVideoUpload, StoreError, VideoStatusUpdate,
};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::DispatcherConfig;

/// MIME type of the data URL uploaded to the store.
const VIDEO_DATA_URL_PREFIX: &str = "data:video/mp4;base64,";

/// Telemetry for one dispatch cycle. Not used to drive later cycles.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Finished videos uploaded to the store.
    pub processed: u32,
    /// Queued rows submitted to the generation API.
    pub started: u32,
    /// Per-item failures recorded during the cycle.
    pub errors: Vec<String>,
}

/// Failure that aborts a whole cycle.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to fetch gallery: {0}")]
    FetchGallery(#[source] StoreError),
}

/// Per-item failure; recorded in the report, never aborts the cycle.
#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error(transparent)]
    Generation(#[from] SeedanceApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives queued gallery rows through the generation API.
pub struct QueueDispatcher {
    store: Arc<dyn GalleryStore>,
    generator: Arc<dyn GenerationApi>,
    default_model: String,
    /// Serializes cycles within this process so overlapping ticks cannot
    /// both observe the same processing count.
    cycle_lock: Mutex<()>,
}

impl QueueDispatcher {
    pub fn new(
        store: Arc<dyn GalleryStore>,
        generator: Arc<dyn GenerationApi>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            generator,
            default_model: default_model.into(),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Build the HTTP-backed dispatcher from validated configuration,
    /// sharing `http` for every upstream call.
    pub fn from_config(config: &DispatcherConfig, http: reqwest::Client) -> Self {
        let store = AppsScriptStore::with_client(http.clone(), config.store_base_url.clone());
        let generator = SeedanceApi::with_client(http, &config.api_base_url, config.api_key.clone());
        Self::new(
            Arc::new(store),
            Arc::new(generator),
            config.default_model_id.clone(),
        )
    }

    pub fn store(&self) -> &Arc<dyn GalleryStore> {
        &self.store
    }

    /// Run one maintenance + admission cycle.
    ///
    /// Fails only when the item list cannot be read; in that case nothing
    /// else is attempted.
    pub async fn run_cycle(&self) -> Result<DispatchReport, DispatchError> {
        let _guard = self.cycle_lock.lock().await;

        let items = self
            .store
            .list_items(None)
            .await
            .map_err(DispatchError::FetchGallery)?;

        let processing: Vec<&GalleryItem> = items
            .iter()
            .filter(|i| i.video_status == VideoStatus::Processing)
            .collect();
        let queued: Vec<&GalleryItem> = items
            .iter()
            .filter(|i| i.video_status == VideoStatus::Queued)
            .collect();

        tracing::debug!(
            total = items.len(),
            processing = processing.len(),
            queued = queued.len(),
            "Dispatch cycle started",
        );

        let mut report = DispatchReport::default();
        self.maintain(&processing, &mut report).await;
        self.admit(&queued, available_slots(processing.len()), &mut report)
            .await;

        if report.processed > 0 || report.started > 0 || !report.errors.is_empty() {
            tracing::info!(
                processed = report.processed,
                started = report.started,
                errors = report.errors.len(),
                "Dispatch cycle finished",
            );
        }
        Ok(report)
    }

    // ---- maintenance ----

    async fn maintain(&self, processing: &[&GalleryItem], report: &mut DispatchReport) {
        for item in processing {
            let Some(task_id) = item.task_id() else {
                tracing::debug!(item_id = %item.id, "Processing row has no task id, skipping");
                continue;
            };

            let snapshot = match self.generator.get_task(task_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    // Deferred to the next cycle.
                    tracing::warn!(item_id = %item.id, task_id, error = %e, "Task poll failed");
                    continue;
                }
            };

            if let Err(e) = self.settle(item, task_id, snapshot, report).await {
                tracing::error!(item_id = %item.id, task_id, error = %e, "Failed to settle task");
                report.errors.push(format!("{}: {e}", item.id));
            }
        }
    }

    /// Write back the outcome of a polled task.
    async fn settle(
        &self,
        item: &GalleryItem,
        task_id: &str,
        snapshot: TaskSnapshot,
        report: &mut DispatchReport,
    ) -> Result<(), ItemError> {
        match snapshot.status {
            TaskStatus::Succeeded => {
                let Some(video_url) = snapshot.video_url else {
                    tracing::warn!(item_id = %item.id, task_id, "Task succeeded without a video URL");
                    return Ok(());
                };
                self.collect_output(item, &video_url).await?;
                report.processed += 1;
                tracing::info!(item_id = %item.id, task_id, "Generated video uploaded");
            }
            TaskStatus::Failed => {
                self.store
                    .update_video_status(&VideoStatusUpdate::new(&item.id, VideoStatus::Failed))
                    .await?;
                tracing::info!(item_id = %item.id, task_id, "Task failed, row marked failed");
            }
            TaskStatus::InFlight(status) => {
                tracing::debug!(item_id = %item.id, task_id, %status, "Task still in flight");
            }
        }
        Ok(())
    }

    /// Download the finished video and upload it next to the source photo.
    async fn collect_output(&self, item: &GalleryItem, video_url: &str) -> Result<(), ItemError> {
        let bytes = self.generator.download_output(video_url).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

        let upload = GeneratedVideoUpload {
            image: format!("{VIDEO_DATA_URL_PREFIX}{encoded}"),
            folder_id: item.session_folder().map(str::to_string),
            related_photo_id: item.id.clone(),
            skip_gallery: false,
        };
        self.store.upload_generated_video(&upload).await?;
        Ok(())
    }

    // ---- admission ----

    async fn admit(&self, queued: &[&GalleryItem], slots: usize, report: &mut DispatchReport) {
        if slots == 0 || queued.is_empty() {
            return;
        }

        for item in queued.iter().take(slots) {
            match self.start_job(item).await {
                Ok(task_id) => {
                    report.started += 1;
                    tracing::info!(item_id = %item.id, task_id = %task_id, "Generation task started");
                }
                Err(e) => {
                    tracing::error!(item_id = %item.id, error = %e, "Failed to start generation task");
                    report.errors.push(format!("{}: {e}", item.id));
                }
            }
        }
    }

    /// Submit one queued row and mark it `processing`.
    async fn start_job(&self, item: &GalleryItem) -> Result<String, ItemError> {
        let params = GenerationParams::resolve(item, &self.default_model);
        let request = CreateTaskRequest::from(&params);

        let task_id = self.generator.create_task(&request).await?;

        let update =
            VideoStatusUpdate::new(&item.id, VideoStatus::Processing).with_task_id(task_id.clone());
        self.store.update_video_status(&update).await?;
        Ok(task_id)
    }
}
