//! In-process dispatch ticker.
//!
//! Runs [`QueueDispatcher::run_cycle`] on a fixed interval so the queue
//! keeps moving without a browser polling `/api/video/tick`. Uses
//! `tokio::time::interval`; missed ticks are delayed, not burst.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::engine::dispatcher::QueueDispatcher;

/// Run the dispatch loop until `cancel` is triggered.
pub async fn run(dispatcher: Arc<QueueDispatcher>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Dispatch ticker started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dispatch ticker stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = dispatcher.run_cycle().await {
                    tracing::error!(error = %e, "Dispatch cycle failed");
                }
            }
        }
    }
}
