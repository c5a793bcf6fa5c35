//! `booth-gallery` -- headless gallery client.
//!
//! Keeps a gallery view in sync with the store and fires the dispatcher
//! tick on the same period, logging every change. Useful for running the
//! queue from a kiosk without the web UI open.
//!
//! See [`ClientConfig::from_env`] for the environment variables.

use std::sync::Arc;

use anyhow::Context;
use booth_core::gallery::VideoStatus;
use booth_gallery::view::{new_view, DisplayItem};
use booth_gallery::{ClientConfig, GalleryPoller, HttpBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booth_gallery=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("Invalid gallery configuration")?;
    tracing::info!(
        api = %config.api_base_url,
        event_id = ?config.event_id,
        interval_secs = config.poll_interval.as_secs(),
        "Starting booth-gallery",
    );

    let backend = Arc::new(HttpBackend::new(
        &config.api_base_url,
        config.store_base_url.clone(),
    ));
    let view = new_view(Vec::new());
    let mut changes = view.subscribe();

    let mut poller = GalleryPoller::new(backend, Arc::clone(&view), config.poll_interval);
    poller.switch_session(config.event_id.clone()).await;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Received Ctrl-C, stopping");
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let items = changes.borrow_and_update().clone();
                let in_flight = items
                    .iter()
                    .filter(|i| i.video_status.is_active())
                    .count();
                let done = items
                    .iter()
                    .filter(|i| i.video_status == VideoStatus::Done)
                    .count();
                tracing::info!(items = items.len(), in_flight, done, "Gallery updated");
                for item in items.iter().filter(|i| i.video_status == VideoStatus::Done) {
                    let display_item = DisplayItem::new(item, &config.api_base_url);
                    tracing::debug!(item_id = %display_item.id, video = ?display_item.video_url, "Video ready");
                }
            }
        }
    }

    poller.stop().await;
    Ok(())
}
