//! Same-origin streaming proxy for remote video files.
//!
//! Browsers cannot seek cross-origin Drive/CDN videos without CORS headers,
//! so `/api/video/proxy?url=...` fetches the origin and relays the bytes
//! chunk-by-chunk. `Range` is forwarded so seeking yields `206` partial
//! content end to end.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    self, HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, RANGE,
};
use axum::http::StatusCode;
use axum::response::Response;
use futures::TryStreamExt;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Content type used when the origin does not send one.
const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Relayed responses may be cached by the browser for an hour.
const CACHE_CONTROL_VALUE: &str = "public, max-age=3600";

/// Response headers copied from the origin when present.
const RELAYED_HEADERS: [header::HeaderName; 3] = [CONTENT_LENGTH, CONTENT_RANGE, ACCEPT_RANGES];

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

/// Parse and check the target URL. Only absolute `http`/`https` URLs pass.
pub fn validate_target(raw: Option<&str>) -> AppResult<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing url param".into()))?;

    let url = Url::parse(raw).map_err(|_| AppError::BadRequest("Invalid protocol".into()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(AppError::BadRequest("Invalid protocol".into())),
    }
}

/// GET /api/video/proxy?url=<encoded absolute URL>
pub async fn stream_proxy(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let target = validate_target(params.url.as_deref())?;

    let mut request = state.http.get(target.clone());
    if let Some(range) = headers.get(RANGE) {
        request = request.header(RANGE, range.clone());
    }

    let upstream = request.send().await.map_err(|e| {
        tracing::warn!(url = %target, error = %e, "Proxy upstream request failed");
        AppError::Upstream(format!("Upstream request failed: {e}"))
    })?;

    let status = upstream.status();
    if !status.is_success() {
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            tracing::warn!(
                url = %target,
                range = ?headers.get(RANGE),
                "Upstream rejected range request",
            );
        }
        return Err(AppError::Upstream(format!(
            "Upstream Error: {}",
            status.as_u16()
        )));
    }

    let mut builder = Response::builder().status(status);
    let upstream_headers = upstream.headers();

    let content_type = upstream_headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    builder = builder.header(header::CONTENT_TYPE, content_type);

    for name in RELAYED_HEADERS {
        if let Some(value) = upstream_headers.get(&name) {
            builder = builder.header(name, value.clone());
        }
    }
    builder = builder.header(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_VALUE),
    );

    tracing::debug!(url = %target, status = status.as_u16(), "Relaying upstream video");

    let stream = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(url = %target, error = %e, "Proxy stream aborted mid-transfer");
    });

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::InternalError(format!("Failed to build proxy response: {e}")))
}

/// OPTIONS /api/video/proxy -- empty `200`; CORS headers come from the layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
