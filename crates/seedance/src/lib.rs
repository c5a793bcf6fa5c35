//! Seedance video-generation API client.
//!
//! Provides the [`GenerationApi`] seam used by the queue dispatcher, an HTTP
//! implementation ([`SeedanceApi`]), request body types, and the
//! ordered-fallback extraction over the API's response shapes.

pub mod api;
pub mod request;
pub mod shapes;

use async_trait::async_trait;
use bytes::Bytes;

pub use api::{SeedanceApi, SeedanceApiError};
pub use request::CreateTaskRequest;
pub use shapes::{TaskSnapshot, TaskStatus};

/// Operations the dispatcher performs against the generation service.
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Submit a generation task and return its id.
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<String, SeedanceApiError>;

    /// Poll a task's status and output.
    async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, SeedanceApiError>;

    /// Download a finished video.
    async fn download_output(&self, video_url: &str) -> Result<Bytes, SeedanceApiError>;
}
