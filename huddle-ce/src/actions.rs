//! Action item lifecycle
//!
//! State machine:
//!   pending -> completed | dismissed   (explicit user action)
//!   pending -> expired                 (time-based sweep, age >= 90 days)
//!   completed | dismissed | expired    = the archive
//!   archived -> deleted                (explicit, irreversible)
//!
//! A pending item voided by a downward crossing is deleted, not archived;
//! that path belongs to the coordinator.
//!
//! The coordinator exclusively creates items; this module exclusively
//! mutates their status.

use crate::state::AppState;
use crate::{db, retry};
use chrono::{DateTime, Duration, Utc};
use huddle_common::db::models::{ActionItem, ActionItemStatus};
use huddle_common::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Pending items older than this are expired by the sweep
pub const EXPIRY_AFTER_DAYS: i64 = 90;

/// Mark a pending item completed. Completing a non-pending item is a
/// no-op success, so the call is safe to repeat.
pub async fn complete(db: &Pool<Sqlite>, item_id: Uuid, user_id: Uuid) -> Result<()> {
    transition(db, item_id, user_id, ActionItemStatus::Completed).await
}

/// Mark a pending item dismissed. Same idempotency contract as `complete`.
pub async fn dismiss(db: &Pool<Sqlite>, item_id: Uuid, user_id: Uuid) -> Result<()> {
    transition(db, item_id, user_id, ActionItemStatus::Dismissed).await
}

async fn transition(
    db: &Pool<Sqlite>,
    item_id: Uuid,
    user_id: Uuid,
    to: ActionItemStatus,
) -> Result<()> {
    let item = db::action_items::get(db, item_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("action item {item_id}")))?;

    if item.status != ActionItemStatus::Pending {
        debug!(
            "action item {} already {}, {} is a no-op",
            item_id,
            item.status.as_str(),
            to.as_str()
        );
        return Ok(());
    }

    if !item.user_guids.contains(&user_id) {
        debug!("user {} acting on action item {} outside its snapshot", user_id, item_id);
    }

    let archived_at = Utc::now();
    let updated = retry::with_backoff("action item transition", || {
        db::action_items::archive(db, item_id, to, archived_at)
    })
    .await?;

    if updated {
        info!("action item {} -> {} by user {}", item_id, to.as_str(), user_id);
    }
    Ok(())
}

/// Void a pending item that lost its threshold. Coordinator-only path.
pub async fn void_pending(db: &Pool<Sqlite>, item_id: Uuid) -> Result<()> {
    retry::with_backoff("action item void", || db::action_items::delete(db, item_id)).await
}

/// Pending items covering a given user
pub async fn list_pending_for_user(db: &Pool<Sqlite>, user_id: Uuid) -> Result<Vec<ActionItem>> {
    let items = retry::with_backoff("pending action items", || db::action_items::list_pending(db))
        .await?;
    Ok(items
        .into_iter()
        .filter(|item| item.user_guids.contains(&user_id))
        .collect())
}

/// Archived items covering a given user
pub async fn list_archived_for_user(db: &Pool<Sqlite>, user_id: Uuid) -> Result<Vec<ActionItem>> {
    let items =
        retry::with_backoff("archived action items", || db::action_items::list_archived(db))
            .await?;
    Ok(items
        .into_iter()
        .filter(|item| item.user_guids.contains(&user_id))
        .collect())
}

/// Permanently delete an archived item. Fails with `InvalidState` for a
/// pending item; the row is unrecoverable afterward.
pub async fn delete_permanently(db: &Pool<Sqlite>, item_id: Uuid) -> Result<()> {
    let item = db::action_items::get(db, item_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("action item {item_id}")))?;

    if !item.status.is_archived() {
        return Err(Error::InvalidState(format!(
            "action item {} is {}, only archived items can be deleted",
            item_id,
            item.status.as_str()
        )));
    }

    retry::with_backoff("action item delete", || db::action_items::delete(db, item_id)).await?;
    info!("action item {} permanently deleted", item_id);
    Ok(())
}

/// Expire pending items created `EXPIRY_AFTER_DAYS` or more before `now`.
/// Returns the ids that were expired by this sweep.
pub async fn expire_stale(db: &Pool<Sqlite>, now: DateTime<Utc>) -> Result<Vec<Uuid>> {
    let cutoff = now - Duration::days(EXPIRY_AFTER_DAYS);
    let stale = db::action_items::list_pending_older_than(db, cutoff).await?;

    let mut expired = Vec::new();
    for item in stale {
        let updated = retry::with_backoff("action item expiry", || {
            db::action_items::archive(db, item.guid, ActionItemStatus::Expired, now)
        })
        .await?;
        if updated {
            expired.push(item.guid);
        }
    }

    if !expired.is_empty() {
        info!("expired {} stale action item(s)", expired.len());
    }
    Ok(expired)
}

/// Background expiration sweep, run on an interval for the process
/// lifetime. The sweep is also available on demand via the API.
pub async fn run_sweeper(state: Arc<AppState>) {
    let period = std::time::Duration::from_secs(state.config.expiration_sweep_interval_secs);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match expire_stale(&state.db, Utc::now()).await {
            Ok(ids) if !ids.is_empty() => {
                state.broadcast_event(huddle_common::events::EngineEvent::ActionItemsExpired {
                    action_item_ids: ids,
                    timestamp: Utc::now(),
                });
            }
            Ok(_) => {}
            Err(err) => warn!("expiration sweep failed: {err}"),
        }
    }
}
