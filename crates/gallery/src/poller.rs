//! Periodic gallery refresh and dispatcher ticks.
//!
//! [`GalleryPoller::start`] spawns two independent tasks sharing one
//! [`CancellationToken`]:
//!
//! - **refresh** -- fetches the item list (first fetch immediately), drops
//!   videos that are not finished, and publishes the result on the view.
//! - **tick** -- calls `/api/video/tick` so queued jobs advance while the
//!   gallery is open. Failures are logged and otherwise ignored.
//!
//! A session switch stops and joins both tasks before the new pair starts,
//! so no refresh for the old session can land after the switch.

use std::sync::Arc;
use std::time::Duration;

use booth_core::gallery::displayable_items;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::backend::GalleryBackend;
use crate::error::GalleryError;
use crate::view::GalleryView;

/// Running refresh/tick pair. Dropping the handle cancels both tasks.
pub struct PollerHandle {
    session: Option<String>,
    cancel: CancellationToken,
    _guard: DropGuard,
    refresh: JoinHandle<()>,
    tick: JoinHandle<()>,
}

impl PollerHandle {
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Cancel both tasks and wait for them to finish.
    pub async fn stop(self) {
        let PollerHandle {
            session,
            cancel,
            _guard,
            refresh,
            tick,
        } = self;
        cancel.cancel();
        let _ = refresh.await;
        let _ = tick.await;
        tracing::debug!(session = ?session, "Gallery poller stopped");
    }
}

/// Owns the background loops for the currently open session.
pub struct GalleryPoller {
    backend: Arc<dyn GalleryBackend>,
    view: GalleryView,
    interval: Duration,
    active: Option<PollerHandle>,
}

impl GalleryPoller {
    pub fn new(backend: Arc<dyn GalleryBackend>, view: GalleryView, interval: Duration) -> Self {
        Self {
            backend,
            view,
            interval,
            active: None,
        }
    }

    /// Spawn a refresh/tick pair for `session` and return its handle.
    pub fn start(&self, session: Option<String>) -> PollerHandle {
        let cancel = CancellationToken::new();

        let refresh = tokio::spawn(refresh_loop(
            Arc::clone(&self.backend),
            Arc::clone(&self.view),
            session.clone(),
            self.interval,
            cancel.clone(),
        ));
        let tick = tokio::spawn(tick_loop(
            Arc::clone(&self.backend),
            self.interval,
            cancel.clone(),
        ));

        tracing::info!(session = ?session, interval_ms = self.interval.as_millis() as u64, "Gallery poller started");

        PollerHandle {
            session,
            _guard: cancel.clone().drop_guard(),
            cancel,
            refresh,
            tick,
        }
    }

    /// Stop the running pair (if any) and start one for `session`.
    pub async fn switch_session(&mut self, session: Option<String>) {
        if let Some(handle) = self.active.take() {
            handle.stop().await;
        }
        self.active = Some(self.start(session));
    }

    /// Session of the running pair, if one is running.
    pub fn active_session(&self) -> Option<Option<&str>> {
        self.active.as_ref().map(PollerHandle::session)
    }

    pub async fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.stop().await;
        }
    }
}

/// Fetch once and publish the displayable items. Returns how many were kept.
pub async fn refresh_once(
    backend: &dyn GalleryBackend,
    view: &GalleryView,
    session: Option<&str>,
) -> Result<usize, GalleryError> {
    let items = displayable_items(backend.fetch_gallery(session).await?);
    let count = items.len();
    view.send_replace(items);
    Ok(count)
}

async fn refresh_loop(
    backend: Arc<dyn GalleryBackend>,
    view: GalleryView,
    session: Option<String>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // A fetch still in flight at cancellation is abandoned, never published.
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    result = refresh_once(backend.as_ref(), &view, session.as_deref()) => {
                        match result {
                            Ok(count) => tracing::debug!(count, "Gallery refreshed"),
                            Err(e) => tracing::warn!(error = %e, "Gallery refresh failed"),
                        }
                    }
                }
            }
        }
    }
}

async fn tick_loop(backend: Arc<dyn GalleryBackend>, interval: Duration, cancel: CancellationToken) {
    // First tick one period after start.
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = backend.tick().await {
                    tracing::warn!(error = %e, "Dispatcher tick failed");
                }
            }
        }
    }
}
