//! Video generation defaults and parameter resolution.
//!
//! Per-item generation parameters come from loosely-typed spreadsheet cells.
//! [`GenerationParams::resolve`] turns them into the values actually sent to
//! the generation API.

use serde::{Deserialize, Serialize};

use crate::drive;
use crate::gallery::{non_blank, GalleryItem};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Prompt used when an item has no `videoPrompt`.
pub const DEFAULT_VIDEO_PROMPT: &str = "Cinematic movement, high quality, slow motion";

/// Model used when neither the item nor the environment names one.
pub const DEFAULT_MODEL_ID: &str = "seedance-1-0-pro-fast-251015";

/// Clip length requested for every job, in seconds.
pub const VIDEO_DURATION_SECS: u32 = 5;

/// Maximum number of rows allowed in `processing` at once.
pub const MAX_CONCURRENT_JOBS: usize = 5;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Output resolution accepted by the generation API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    P720,
    #[default]
    #[serde(rename = "480p")]
    P480,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::P720 => "720p",
            Resolution::P480 => "480p",
        }
    }

    /// Exact match against `"720p"` / `"480p"`; everything else is `480p`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("720p") => Resolution::P720,
            _ => Resolution::P480,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parameter resolution
// ---------------------------------------------------------------------------

/// Effective parameters for one generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub prompt: String,
    pub resolution: Resolution,
    pub model: String,
    /// Publicly downloadable source image for the job.
    pub image_url: String,
    pub duration_secs: u32,
    pub audio: bool,
}

impl GenerationParams {
    /// Resolve the parameters for `item`, falling back to the defaults for
    /// blank or invalid cells.
    pub fn resolve(item: &GalleryItem, default_model: &str) -> Self {
        let prompt = non_blank(item.video_prompt.as_deref())
            .unwrap_or(DEFAULT_VIDEO_PROMPT)
            .to_string();
        let model = non_blank(item.video_model.as_deref())
            .unwrap_or(default_model)
            .to_string();

        Self {
            prompt,
            resolution: Resolution::from_raw(item.video_resolution.as_deref()),
            model,
            image_url: drive::download_url(&item.id),
            duration_secs: VIDEO_DURATION_SECS,
            audio: false,
        }
    }
}

/// Number of queued rows that may be admitted given the current
/// `processing` count.
pub fn available_slots(processing: usize) -> usize {
    MAX_CONCURRENT_JOBS.saturating_sub(processing)
}
