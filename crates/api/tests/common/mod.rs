#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use booth_core::gallery::{GalleryItem, VideoStatus};
use booth_seedance::{CreateTaskRequest, GenerationApi, SeedanceApiError, TaskSnapshot, TaskStatus};
use booth_store::{GalleryStore, GeneratedVideoUpload, StoreError, VideoStatusUpdate};
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

use booth_api::config::{ConfigError, ServerConfig};
use booth_api::engine::dispatcher::QueueDispatcher;
use booth_api::router::build_app_router;
use booth_api::state::AppState;

pub const TEST_MODEL: &str = "seedance-test-model";

/// Build a test `ServerConfig` with safe defaults and a 30-second request
/// timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        tick_interval_secs: None,
    }
}

fn missing_config() -> ConfigError {
    ConfigError::Missing(vec!["ARK_API_KEY", "ARK_BASE_URL", "APPS_SCRIPT_BASE_URL"])
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store fake that applies writes to its rows the way the sheet does.
#[derive(Default)]
pub struct MemoryStore {
    pub items: Mutex<Vec<GalleryItem>>,
    pub updates: Mutex<Vec<VideoStatusUpdate>>,
    pub uploads: Mutex<Vec<GeneratedVideoUpload>>,
    pub fail_list: AtomicBool,
    pub fail_writes: AtomicBool,
    /// Delay applied before every status write lands.
    pub write_delay: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn with_items(items: Vec<GalleryItem>) -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(items),
            ..Default::default()
        })
    }

    pub fn item(&self, id: &str) -> GalleryItem {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .expect("item exists")
    }

    pub fn status_of(&self, id: &str) -> VideoStatus {
        self.item(id).video_status
    }
}

#[async_trait]
impl GalleryStore for MemoryStore {
    async fn list_items(&self, _event_id: Option<&str>) -> Result<Vec<GalleryItem>, StoreError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::ApiError {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn update_video_status(&self, update: &VideoStatusUpdate) -> Result<(), StoreError> {
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("write refused".into()));
        }
        self.updates.lock().unwrap().push(update.clone());
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == update.photo_id) {
            item.video_status = update.status;
            if let Some(task_id) = &update.task_id {
                item.video_task_id = Some(task_id.clone());
            }
            if let Some(folder) = &update.session_folder_id {
                item.session_folder_id = Some(folder.clone());
            }
            if let Some(prompt) = &update.prompt {
                item.video_prompt = Some(prompt.clone());
            }
            if let Some(resolution) = update.resolution {
                item.video_resolution = Some(resolution.as_str().to_string());
            }
            if let Some(model) = &update.model {
                item.video_model = Some(model.clone());
            }
        }
        Ok(())
    }

    async fn upload_generated_video(&self, upload: &GeneratedVideoUpload) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("upload refused".into()));
        }
        self.uploads.lock().unwrap().push(upload.clone());
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == upload.related_photo_id) {
            item.video_status = VideoStatus::Done;
            item.video_file_id = Some(format!("video-of-{}", item.id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fake generation API
// ---------------------------------------------------------------------------

/// Generation API fake. Task ids are `task-1`, `task-2`, ... in creation
/// order; polls answer from `tasks` (unknown ids are a 404).
#[derive(Default)]
pub struct FakeGenerator {
    pub tasks: Mutex<HashMap<String, TaskSnapshot>>,
    pub failing_polls: Mutex<HashSet<String>>,
    /// Photo ids whose create calls fail.
    pub failing_creates: Mutex<HashSet<String>>,
    pub created: Mutex<Vec<serde_json::Value>>,
    pub downloads: Mutex<Vec<String>>,
    pub fail_downloads: AtomicBool,
    next_id: AtomicU32,
}

impl FakeGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_task(&self, task_id: &str, status: TaskStatus, video_url: Option<&str>) {
        self.tasks.lock().unwrap().insert(
            task_id.to_string(),
            TaskSnapshot {
                status,
                video_url: video_url.map(str::to_string),
            },
        );
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationApi for FakeGenerator {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<String, SeedanceApiError> {
        let body = serde_json::to_value(request).unwrap();
        let image_url = body["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let failing = self
            .failing_creates
            .lock()
            .unwrap()
            .iter()
            .any(|id| image_url.ends_with(&format!("id={id}")));
        if failing {
            return Err(SeedanceApiError::ApiError {
                status: 500,
                body: "generation backend down".into(),
            });
        }

        self.created.lock().unwrap().push(body);
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("task-{n}"))
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, SeedanceApiError> {
        if self.failing_polls.lock().unwrap().contains(task_id) {
            return Err(SeedanceApiError::ApiError {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        self.tasks
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .ok_or(SeedanceApiError::ApiError {
                status: 404,
                body: "no such task".into(),
            })
    }

    async fn download_output(&self, video_url: &str) -> Result<Bytes, SeedanceApiError> {
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(SeedanceApiError::ApiError {
                status: 403,
                body: "expired".into(),
            });
        }
        self.downloads.lock().unwrap().push(video_url.to_string());
        Ok(Bytes::from_static(b"MP4"))
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

pub fn queued(id: &str) -> GalleryItem {
    GalleryItem {
        id: id.to_string(),
        video_status: VideoStatus::Queued,
        session_folder_id: Some(format!("folder-{id}")),
        ..Default::default()
    }
}

pub fn processing(id: &str, task_id: Option<&str>) -> GalleryItem {
    GalleryItem {
        id: id.to_string(),
        video_status: VideoStatus::Processing,
        video_task_id: task_id.map(str::to_string),
        session_folder_id: Some(format!("folder-{id}")),
        ..Default::default()
    }
}

pub fn idle(id: &str) -> GalleryItem {
    GalleryItem {
        id: id.to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub fn dispatcher(store: &Arc<MemoryStore>, generator: &Arc<FakeGenerator>) -> QueueDispatcher {
    QueueDispatcher::new(store.clone(), generator.clone(), TEST_MODEL)
}

/// State with every dependency backed by the given fakes.
pub fn configured_state(store: &Arc<MemoryStore>, generator: &Arc<FakeGenerator>) -> AppState {
    AppState {
        config: Arc::new(test_config()),
        http: reqwest::Client::new(),
        dispatcher: Ok(Arc::new(dispatcher(store, generator))),
        store: Ok(store.clone() as Arc<dyn GalleryStore>),
    }
}

/// State as seen when the environment is empty.
pub fn unconfigured_state() -> AppState {
    AppState {
        config: Arc::new(test_config()),
        http: reqwest::Client::new(),
        dispatcher: Err(missing_config()),
        store: Err(ConfigError::Missing(vec!["APPS_SCRIPT_BASE_URL"])),
    }
}

/// Build the full application router with all middleware layers.
///
/// Uses the same [`build_app_router`] as `main.rs` so integration tests
/// exercise the production middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Like [`build_test_app`] but with a custom request timeout.
pub fn build_test_app_with_timeout(state: AppState, request_timeout_secs: u64) -> Router {
    let config = ServerConfig {
        request_timeout_secs,
        ..test_config()
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a `{ error, code }` JSON error response.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) -> String {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
    json["error"].as_str().unwrap_or_default().to_string()
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
