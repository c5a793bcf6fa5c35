use booth_core::generation::DEFAULT_MODEL_ID;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Timeout for non-streaming requests in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Interval of the in-process dispatch ticker. `None` leaves ticking to
    /// clients calling `/api/video/tick`.
    pub tick_interval_secs: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default    |
    /// |------------------------|------------|
    /// | `HOST`                 | `0.0.0.0`  |
    /// | `PORT`                 | `3000`     |
    /// | `REQUEST_TIMEOUT_SECS` | `60`       |
    /// | `TICK_INTERVAL_SECS`   | unset (off)|
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let tick_interval_secs = std::env::var("TICK_INTERVAL_SECS")
            .ok()
            .map(|v| {
                v.parse::<u64>()
                    .expect("TICK_INTERVAL_SECS must be a valid u64")
            })
            .filter(|secs| *secs > 0);

        Self {
            host,
            port,
            request_timeout_secs,
            tick_interval_secs,
        }
    }
}

/// Missing or invalid dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Config missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Credentials and endpoints for the queue dispatcher.
///
/// Validated once at startup; handlers receive the result rather than
/// reading the environment per request.
#[derive(Clone)]
pub struct DispatcherConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub store_base_url: String,
    pub default_model_id: String,
}

impl std::fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("store_base_url", &self.store_base_url)
            .field("default_model_id", &self.default_model_id)
            .finish()
    }
}

impl DispatcherConfig {
    /// | Env Var                | Required | Default                        |
    /// |------------------------|----------|--------------------------------|
    /// | `ARK_API_KEY`          | yes      | --                             |
    /// | `ARK_BASE_URL`         | yes      | --                             |
    /// | `APPS_SCRIPT_BASE_URL` | yes      | --                             |
    /// | `SEEDANCE_MODEL_ID`    | no       | `seedance-1-0-pro-fast-251015` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("ARK_API_KEY");
        let api_base_url = get("ARK_BASE_URL");
        let store_base_url = get("APPS_SCRIPT_BASE_URL");

        match (api_key, api_base_url, store_base_url) {
            (Some(api_key), Some(api_base_url), Some(store_base_url)) => Ok(Self {
                api_key,
                api_base_url,
                store_base_url,
                default_model_id: get("SEEDANCE_MODEL_ID")
                    .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            }),
            (api_key, api_base_url, store_base_url) => {
                let missing = [
                    ("ARK_API_KEY", api_key.is_none()),
                    ("ARK_BASE_URL", api_base_url.is_none()),
                    ("APPS_SCRIPT_BASE_URL", store_base_url.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(ConfigError::Missing(missing))
            }
        }
    }
}

/// Store URL on its own, for routes that only talk to the store.
pub fn store_base_url_from_env() -> Result<String, ConfigError> {
    std::env::var("APPS_SCRIPT_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing(vec!["APPS_SCRIPT_BASE_URL"]))
}
