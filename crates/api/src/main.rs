use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use booth_store::{AppsScriptStore, GalleryStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booth_api::background;
use booth_api::config::{self, DispatcherConfig, ServerConfig};
use booth_api::engine::dispatcher::QueueDispatcher;
use booth_api::router::build_app_router;
use booth_api::state::AppState;

/// Connect timeout for every upstream call (store, generation API, proxy).
const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- HTTP client ---
    let http = reqwest::Client::builder()
        .connect_timeout(UPSTREAM_CONNECT_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    // --- Upstream dependencies ---
    let dispatcher = DispatcherConfig::from_env()
        .map(|cfg| Arc::new(QueueDispatcher::from_config(&cfg, http.clone())));
    match &dispatcher {
        Ok(_) => tracing::info!("Queue dispatcher configured"),
        Err(e) => tracing::warn!(error = %e, "Queue dispatcher disabled"),
    }

    let store = config::store_base_url_from_env().map(|url| {
        Arc::new(AppsScriptStore::with_client(http.clone(), url)) as Arc<dyn GalleryStore>
    });

    // --- Background ticker ---
    let ticker_cancel = CancellationToken::new();
    let ticker_handle = match (&dispatcher, config.tick_interval_secs) {
        (Ok(dispatcher), Some(secs)) => Some(tokio::spawn(background::ticker::run(
            Arc::clone(dispatcher),
            Duration::from_secs(secs),
            ticker_cancel.clone(),
        ))),
        _ => None,
    };

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        http,
        dispatcher,
        store,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    ticker_cancel.cancel();
    if let Some(handle) = ticker_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Dispatch ticker stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
