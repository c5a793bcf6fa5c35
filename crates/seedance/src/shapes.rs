//! Ordered-fallback extraction over the generation API's response shapes.
//!
//! Deployments of the API wrap payloads differently. Each extractor walks a
//! fixed precedence list and returns the first candidate that is present:
//!
//! | Value         | Precedence                                               |
//! |---------------|----------------------------------------------------------|
//! | payload root  | `Result` → `data` → document                             |
//! | task status   | `<root>.status`, defaulting to `processing`              |
//! | video URL     | `<root>.content.video_url` → `<root>.output.video_url` → `<root>.video_url` |
//! | new task id   | `id` → `Result.id`                                       |

use serde_json::Value;

/// Wrapper keys tried, in order, before falling back to the document itself.
const ROOT_KEYS: &[&str] = &["Result", "data"];

/// Paths tried, in order, for the produced video URL.
const VIDEO_URL_PATHS: &[&[&str]] = &[
    &["content", "video_url"],
    &["output", "video_url"],
    &["video_url"],
];

/// Paths tried, in order, for the id returned by task creation.
const TASK_ID_PATHS: &[&[&str]] = &[&["id"], &["Result", "id"]];

/// Status assumed when the payload carries none.
pub const STATUS_IN_FLIGHT: &str = "processing";

/// Generation task state as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Succeeded,
    Failed,
    /// Anything else; the raw lowercased value is kept for logging.
    InFlight(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        match lowered.as_str() {
            "succeeded" | "success" => TaskStatus::Succeeded,
            "failed" | "error" => TaskStatus::Failed,
            _ => TaskStatus::InFlight(lowered),
        }
    }
}

/// Status and output of one task poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    pub video_url: Option<String>,
}

impl TaskSnapshot {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            status: task_status(payload),
            video_url: video_url(payload).map(str::to_string),
        }
    }
}

/// Object holding the task fields.
pub fn payload_root(payload: &Value) -> &Value {
    ROOT_KEYS
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|candidate| is_present(candidate))
        .unwrap_or(payload)
}

pub fn task_status(payload: &Value) -> TaskStatus {
    let raw = payload_root(payload)
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(STATUS_IN_FLIGHT);
    TaskStatus::parse(raw)
}

pub fn video_url(payload: &Value) -> Option<&str> {
    first_string(payload_root(payload), VIDEO_URL_PATHS)
}

pub fn created_task_id(payload: &Value) -> Option<&str> {
    first_string(payload, TASK_ID_PATHS)
}

fn first_string<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// JavaScript-style truthiness for wrapper objects: `null`, `false` and
/// empty strings do not count as a wrapper.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
