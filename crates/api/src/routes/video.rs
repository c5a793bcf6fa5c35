//! Route definitions for the video pipeline.
//!
//! Mounted at `/api/video`.
//!
//! ```text
//! GET     /proxy?url=...    stream_proxy
//! OPTIONS /proxy            preflight
//! GET     /tick             run_tick
//! POST    /start            start_video
//! ```
//!
//! Any other method on these paths answers `405` JSON. The request timeout
//! applies to `/tick` and `/start` only; proxied streams run until the
//! origin or the client closes them.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::handlers::{method_not_allowed, proxy, start, tick};
use crate::state::AppState;

pub fn router(request_timeout: Duration) -> Router<AppState> {
    Router::new()
        .route("/tick", get(tick::run_tick).fallback(method_not_allowed))
        .route("/start", post(start::start_video).fallback(method_not_allowed))
        // Applies to the routes above only.
        .route_layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .route(
            "/proxy",
            get(proxy::stream_proxy)
                .options(proxy::preflight)
                .fallback(method_not_allowed),
        )
}
