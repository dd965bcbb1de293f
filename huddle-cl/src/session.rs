//! Optimistic toggle reconciliation
//!
//! Three-step protocol: tentative local apply, server confirm, compensate
//! on failure. The outcome is a tagged value, so callers cannot forget the
//! revert path. A timeout counts as a failure: the local flip is undone
//! and the caller must `refresh()` before retrying, because toggle is an
//! edge flip and a blind retry of a successful-but-unacknowledged call
//! would flip twice.

use crate::transport::EngineTransport;
use crate::view::ClientInterestView;
use huddle_common::api::types::{ActionItemDelta, ActionItemInfo};
use huddle_common::{Error, Result};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of an optimistic toggle
#[derive(Debug)]
pub enum ToggleOutcome {
    /// Server confirmed; the local state was kept.
    Confirmed {
        now_interested: bool,
        action_item: Option<ActionItemDelta>,
    },
    /// Server call failed; the local state was reverted to its pre-call
    /// value.
    RolledBack { error: Error },
    /// A toggle for this venue is already in flight; nothing was changed.
    /// Callers should disable the control instead of queueing toggles.
    Busy,
}

struct SessionState {
    view: ClientInterestView,
    in_flight: HashSet<Uuid>,
}

/// One user's client session: the optimistic interest view plus the
/// reconciliation logic around it.
///
/// Methods take `&self`; a background poller may read while a toggle is
/// in flight. The internal lock is never held across an await.
pub struct Session<T: EngineTransport> {
    user_id: Uuid,
    transport: T,
    state: Mutex<SessionState>,
}

impl<T: EngineTransport> Session<T> {
    pub fn new(user_id: Uuid, transport: T) -> Self {
        Self {
            user_id,
            transport,
            state: Mutex::new(SessionState {
                view: ClientInterestView::new(),
                in_flight: HashSet::new(),
            }),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Snapshot of the current (possibly optimistic) view
    pub fn view(&self) -> ClientInterestView {
        self.lock().view.clone()
    }

    pub fn is_interested(&self, venue_id: Uuid) -> bool {
        self.lock().view.is_interested(venue_id)
    }

    /// Toggle interest in a venue, applying the flip locally before the
    /// server confirms and compensating if it does not.
    pub async fn toggle_interest_optimistic(&self, venue_id: Uuid) -> ToggleOutcome {
        // Tentative apply, guarded against overlapping toggles for the
        // same venue.
        {
            let mut state = self.lock();
            if !state.in_flight.insert(venue_id) {
                debug!("toggle for venue {} already in flight", venue_id);
                return ToggleOutcome::Busy;
            }
            state.view.flip(venue_id);
        }

        let result = self.transport.toggle_interest(self.user_id, venue_id).await;

        let mut state = self.lock();
        state.in_flight.remove(&venue_id);
        match result {
            Ok(response) => {
                // The server is authoritative. It normally agrees with the
                // tentative flip; trust it if it does not.
                state.view.set(venue_id, response.now_interested);
                ToggleOutcome::Confirmed {
                    now_interested: response.now_interested,
                    action_item: response.action_item,
                }
            }
            Err(error) => {
                state.view.flip(venue_id);
                warn!("toggle for venue {} failed, reverted: {}", venue_id, error);
                ToggleOutcome::RolledBack { error }
            }
        }
    }

    /// Replace the optimistic view with authoritative server state.
    pub async fn refresh(&self) -> Result<()> {
        let venues = self.transport.interested_venues(self.user_id).await?;
        self.lock().view.replace(venues);
        Ok(())
    }

    /// Read-only fetch of the user's pending action items. Used by the
    /// poller; never mutates the interest view.
    pub async fn fetch_action_items(&self) -> Result<Vec<ActionItemInfo>> {
        self.transport.pending_action_items(self.user_id).await
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state poisoned")
    }
}
