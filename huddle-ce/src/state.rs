//! Shared engine state
//!
//! One instance per process, constructor-injected into the router and the
//! background tasks. All writes to the ledger and the action item store go
//! through operations that receive this state explicitly; there is no
//! global mutable state.

use crate::locks::VenueLocks;
use huddle_common::config::EngineConfig;
use huddle_common::events::EngineEvent;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

/// State shared by all handlers and background tasks
pub struct AppState {
    pub db: SqlitePool,
    pub config: EngineConfig,
    pub locks: VenueLocks,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            db,
            config,
            locks: VenueLocks::new(),
            event_tx,
        }
    }

    /// Broadcast an event to all SSE listeners. No receivers is fine.
    pub fn broadcast_event(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the engine event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }
}
