//! Task creation request body.

use booth_core::generation::{GenerationParams, Resolution};
use serde::Serialize;

/// `POST /contents/generations/tasks` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub model: String,
    pub content: Vec<ContentPart>,
    pub parameters: TaskParameters,
}

/// One multimodal input part.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskParameters {
    pub duration: u32,
    pub resolution: Resolution,
    pub audio: bool,
}

impl From<&GenerationParams> for CreateTaskRequest {
    fn from(params: &GenerationParams) -> Self {
        Self {
            model: params.model.clone(),
            content: vec![
                ContentPart::Text {
                    text: params.prompt.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: params.image_url.clone(),
                    },
                },
            ],
            parameters: TaskParameters {
                duration: params.duration_secs,
                resolution: params.resolution,
                audio: params.audio,
            },
        }
    }
}
