//! REST client for the Seedance generation endpoints.
//!
//! Wraps task creation, task polling and output download using
//! [`reqwest`]. Every request carries `Authorization: Bearer <key>`.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::request::CreateTaskRequest;
use crate::shapes::{self, TaskSnapshot};
use crate::GenerationApi;

const TASKS_PATH: &str = "contents/generations/tasks";

/// HTTP client for one generation API deployment.
#[derive(Clone)]
pub struct SeedanceApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Errors from the generation API layer.
#[derive(Debug, thiserror::Error)]
pub enum SeedanceApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Seedance API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Task creation succeeded but no task id was found in the response.
    #[error("Task creation response carried no task id")]
    MissingTaskId,
}

impl SeedanceApi {
    /// * `base_url` - API root, e.g. `https://ark.example.com/api/v3`. A
    ///   trailing `/` is ignored.
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/{TASKS_PATH}", self.base_url)
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/{TASKS_PATH}/{task_id}", self.base_url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`SeedanceApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SeedanceApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SeedanceApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body.
    async fn parse_json(response: reqwest::Response) -> Result<Value, SeedanceApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl GenerationApi for SeedanceApi {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<String, SeedanceApiError> {
        let response = self
            .client
            .post(self.tasks_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let payload = Self::parse_json(response).await?;
        shapes::created_task_id(&payload)
            .map(str::to_string)
            .ok_or(SeedanceApiError::MissingTaskId)
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, SeedanceApiError> {
        let response = self
            .client
            .get(self.task_url(task_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let payload = Self::parse_json(response).await?;
        Ok(TaskSnapshot::from_payload(&payload))
    }

    async fn download_output(&self, video_url: &str) -> Result<Bytes, SeedanceApiError> {
        // Output URLs are pre-signed; no auth header.
        let response = self.client.get(video_url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?)
    }
}
