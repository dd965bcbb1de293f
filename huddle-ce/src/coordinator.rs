//! Threshold Coordinator (booking agent)
//!
//! Watches per-venue interest mutations and creates or voids action items
//! when the live count crosses the activation threshold. Crossing state is
//! re-derived on every call from (current count, pending-item existence):
//! the pending item itself is the idempotency token. There is no stored
//! "already triggered" flag, so a run that fails after a detected crossing
//! can simply be repeated.
//!
//! All reads and writes for one venue happen under that venue's lock;
//! different venues never contend.

use crate::state::AppState;
use crate::{actions, db, ledger};
use chrono::Utc;
use huddle_common::api::types::ActionItemDelta;
use huddle_common::db::models::{ActionItem, ActionItemStatus};
use huddle_common::events::EngineEvent;
use huddle_common::{Error, Result};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a toggle processed through the coordinator
#[derive(Debug)]
pub struct ToggleReport {
    pub now_interested: bool,
    pub delta: Option<ActionItemDelta>,
}

/// Toggle a user's interest in a venue and evaluate the threshold, all
/// under the venue's mutual-exclusion scope.
pub async fn apply_toggle(state: &AppState, user_id: Uuid, venue_id: Uuid) -> Result<ToggleReport> {
    // Existence checks are plain catalog reads; they stay outside the lock.
    db::catalog::get_user(&state.db, user_id).await?;
    let venue = db::catalog::get_venue(&state.db, venue_id).await?;

    let _guard = state.locks.lock(venue_id).await;

    let effect = ledger::toggle(&state.db, user_id, venue_id).await?;
    let count = ledger::count(&state.db, venue_id).await?;

    state.broadcast_event(EngineEvent::InterestChanged {
        user_id,
        venue_id,
        now_interested: effect.now_interested,
        interested_count: count,
        timestamp: Utc::now(),
    });

    let delta = evaluate_crossing(state, venue_id, &venue.name).await?;
    Ok(ToggleReport {
        now_interested: effect.now_interested,
        delta,
    })
}

/// Re-evaluate one venue against the threshold.
///
/// Safe to call at any time: when the count has not changed since the last
/// evaluation this is a no-op. Used for reconciliation after a failed run.
pub async fn on_interest_changed(
    state: &AppState,
    venue_id: Uuid,
) -> Result<Option<ActionItemDelta>> {
    let venue = db::catalog::get_venue(&state.db, venue_id).await?;
    let _guard = state.locks.lock(venue_id).await;
    evaluate_crossing(state, venue_id, &venue.name).await
}

/// Crossing check and action. Caller must hold the venue lock.
async fn evaluate_crossing(
    state: &AppState,
    venue_id: Uuid,
    venue_name: &str,
) -> Result<Option<ActionItemDelta>> {
    match try_evaluate(state, venue_id, venue_name).await {
        Err(Error::ConcurrencyConflict(reason)) => {
            // Another writer (e.g. a second engine process on the same
            // database) created a pending item between our read and our
            // insert. One re-derivation from fresh state settles it.
            warn!("crossing conflict for venue {venue_id}: {reason}; re-deriving");
            try_evaluate(state, venue_id, venue_name).await
        }
        other => other,
    }
}

async fn try_evaluate(
    state: &AppState,
    venue_id: Uuid,
    venue_name: &str,
) -> Result<Option<ActionItemDelta>> {
    let count = ledger::count(&state.db, venue_id).await?;
    let pending = db::action_items::pending_for_venue(&state.db, venue_id).await?;
    let threshold = state.config.activation_threshold;

    match pending {
        None if count >= threshold => {
            let snapshot = ledger::interested_user_ids(&state.db, venue_id).await?;
            let item = ActionItem {
                guid: Uuid::new_v4(),
                venue_guid: venue_id,
                user_guids: snapshot,
                code: confirmation_code(venue_id),
                status: ActionItemStatus::Pending,
                created_at: Utc::now(),
                archived_at: None,
            };
            db::action_items::insert(&state.db, &item).await?;

            info!(
                "action item {} created for venue {} (count {} >= threshold {})",
                item.guid, venue_id, count, threshold
            );
            state.broadcast_event(EngineEvent::ActionItemCreated {
                action_item_id: item.guid,
                venue_id,
                code: item.code.clone(),
                party_size: item.user_guids.len(),
                timestamp: Utc::now(),
            });

            Ok(Some(ActionItemDelta::Created {
                action_item_id: item.guid,
                code: item.code,
                message: format!(
                    "Group of {} ready for {}",
                    item.user_guids.len(),
                    venue_name
                ),
                user_ids: item.user_guids,
            }))
        }
        Some(item) if count < threshold => {
            // The item never represented a completed commitment, so it is
            // voided outright rather than archived.
            actions::void_pending(&state.db, item.guid).await?;

            info!(
                "action item {} canceled for venue {} (count {} < threshold {})",
                item.guid, venue_id, count, threshold
            );
            state.broadcast_event(EngineEvent::ActionItemCanceled {
                action_item_id: item.guid,
                venue_id,
                timestamp: Utc::now(),
            });

            Ok(Some(ActionItemDelta::Canceled {
                action_item_id: item.guid,
                message: format!("Group action for {venue_name} canceled: not enough interest"),
            }))
        }
        // No crossing. The common case: one count query, no write.
        _ => Ok(None),
    }
}

/// Human-readable confirmation code, e.g. "HDL-1a2b3c-4821"
fn confirmation_code(venue_id: Uuid) -> String {
    let venue_hex = venue_id.simple().to_string();
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("HDL-{}-{}", &venue_hex[..6], suffix)
}
