use std::time::Duration;

/// PIN sent with single-photo deletes when no admin PIN is configured.
pub const DEFAULT_DELETE_PIN: &str = "0000";

/// Default refresh and tick period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Invalid or missing client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} must be a positive integer, got {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Gallery client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the booth API server (proxy, tick, start).
    pub api_base_url: String,
    /// Apps Script web app URL.
    pub store_base_url: String,
    /// Admin PIN gating deletes and clears.
    pub admin_pin: Option<String>,
    /// Event/session the gallery is scoped to.
    pub event_id: Option<String>,
    /// Prompt sent with manual video requests.
    pub video_prompt: Option<String>,
    /// Period of both the refresh and the tick loop.
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Required | Default                 |
    /// |------------------------|----------|-------------------------|
    /// | `BOOTH_API_URL`        | no       | `http://localhost:3000` |
    /// | `APPS_SCRIPT_BASE_URL` | yes      | --                      |
    /// | `ADMIN_PIN`            | no       | unset                   |
    /// | `EVENT_ID`             | no       | unset (all events)      |
    /// | `VIDEO_PROMPT`         | no       | unset (server default)  |
    /// | `GALLERY_POLL_SECS`    | no       | `5`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_base_url =
            get("APPS_SCRIPT_BASE_URL").ok_or(ConfigError::Missing("APPS_SCRIPT_BASE_URL"))?;

        let poll_interval = match get("GALLERY_POLL_SECS") {
            None => DEFAULT_POLL_INTERVAL,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "GALLERY_POLL_SECS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            api_base_url: get("BOOTH_API_URL")
                .unwrap_or_else(|| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            store_base_url,
            admin_pin: get("ADMIN_PIN"),
            event_id: get("EVENT_ID"),
            video_prompt: get("VIDEO_PROMPT"),
            poll_interval,
        })
    }
}
