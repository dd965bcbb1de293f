//! Cancellable polling for server-driven refreshes
//!
//! Bound to a view's lifetime: start when the view appears, stop when it
//! goes away (explicitly or by dropping the handle). The loop is
//! sequential, so at most one poll per resource is ever in flight; a slow
//! fetch delays the next tick instead of stacking requests. Polls only
//! read server state, they never mutate the ledger.

use huddle_common::Result;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to a running poll loop
pub struct Poller {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn a repeating poll. The first poll fires immediately, then
    /// every `interval`. Poll errors are logged and the loop continues.
    pub fn start<F, Fut>(interval: Duration, mut poll: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = poll().await {
                            warn!("poll failed: {err}");
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("poller stopped");
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for any in-flight poll to finish.
    pub async fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // Dropping the handle cancels the loop at the next select point.
        let _ = self.stop_tx.send(true);
    }
}
