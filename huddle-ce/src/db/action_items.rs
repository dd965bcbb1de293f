//! Action item queries
//!
//! Raw storage operations on the action_items table. Lifecycle rules live
//! in `crate::actions`; creation/cancellation in `crate::coordinator`.

use chrono::{DateTime, Utc};
use huddle_common::db::models::{ActionItem, ActionItemStatus};
use huddle_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

const COLUMNS: &str = "guid, venue_guid, user_guids, code, status, created_at, archived_at";

/// Insert a freshly created item.
///
/// A unique violation on the pending-per-venue index means another
/// coordinator created a pending item between our read and this write; that
/// surfaces as `ConcurrencyConflict` so the caller can re-derive.
pub async fn insert(db: &Pool<Sqlite>, item: &ActionItem) -> Result<()> {
    let user_guids = serde_json::to_string(&item.user_guids)
        .map_err(|e| Error::Internal(format!("serialize failed: {e}")))?;

    sqlx::query(
        "INSERT INTO action_items \
         (guid, venue_guid, user_guids, code, status, created_at, archived_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.guid.to_string())
    .bind(item.venue_guid.to_string())
    .bind(user_guids)
    .bind(&item.code)
    .bind(item.status.as_str())
    .bind(item.created_at.to_rfc3339())
    .bind(item.archived_at.map(|t| t.to_rfc3339()))
    .execute(db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::ConcurrencyConflict(format!(
                "pending action item already exists for venue {}",
                item.venue_guid
            ))
        }
        _ => Error::Database(e),
    })?;
    Ok(())
}

/// Get one item by id
pub async fn get(db: &Pool<Sqlite>, item_id: Uuid) -> Result<Option<ActionItem>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM action_items WHERE guid = ?"))
        .bind(item_id.to_string())
        .fetch_optional(db)
        .await?;

    row.as_ref().map(row_to_item).transpose()
}

/// The venue's pending item, if one exists (0 or 1 by invariant)
pub async fn pending_for_venue(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<Option<ActionItem>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM action_items WHERE venue_guid = ? AND status = 'pending'"
    ))
    .bind(venue_id.to_string())
    .fetch_optional(db)
    .await?;

    row.as_ref().map(row_to_item).transpose()
}

/// All pending items, newest first
pub async fn list_pending(db: &Pool<Sqlite>) -> Result<Vec<ActionItem>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM action_items WHERE status = 'pending' ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_item).collect()
}

/// All archived items (completed/dismissed/expired), newest archive first
pub async fn list_archived(db: &Pool<Sqlite>) -> Result<Vec<ActionItem>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM action_items WHERE status != 'pending' \
         ORDER BY archived_at DESC, created_at DESC"
    ))
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_item).collect()
}

/// Pending items created at or before the cutoff
pub async fn list_pending_older_than(
    db: &Pool<Sqlite>,
    cutoff: DateTime<Utc>,
) -> Result<Vec<ActionItem>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM action_items WHERE status = 'pending' AND created_at <= ?"
    ))
    .bind(cutoff.to_rfc3339())
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_item).collect()
}

/// Archive a pending item. Returns false if the item was not pending
/// anymore (someone else archived it first).
pub async fn archive(
    db: &Pool<Sqlite>,
    item_id: Uuid,
    status: ActionItemStatus,
    archived_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE action_items SET status = ?, archived_at = ? \
         WHERE guid = ? AND status = 'pending'",
    )
    .bind(status.as_str())
    .bind(archived_at.to_rfc3339())
    .bind(item_id.to_string())
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete an item row outright
pub async fn delete(db: &Pool<Sqlite>, item_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM action_items WHERE guid = ?")
        .bind(item_id.to_string())
        .execute(db)
        .await?;
    Ok(())
}

fn row_to_item(row: &SqliteRow) -> Result<ActionItem> {
    let status_text: String = row.get("status");
    let status = ActionItemStatus::from_str(&status_text)
        .ok_or_else(|| Error::Internal(format!("unknown action item status: {status_text}")))?;

    let user_guids: Vec<Uuid> = serde_json::from_str(&row.get::<String, _>("user_guids"))
        .map_err(|e| Error::Internal(format!("invalid user_guids column: {e}")))?;

    Ok(ActionItem {
        guid: super::parse_guid(&row.get::<String, _>("guid"))?,
        venue_guid: super::parse_guid(&row.get::<String, _>("venue_guid"))?,
        user_guids,
        code: row.get("code"),
        status,
        created_at: super::parse_timestamp(&row.get::<String, _>("created_at"))?,
        archived_at: row
            .get::<Option<String>, _>("archived_at")
            .as_deref()
            .map(super::parse_timestamp)
            .transpose()?,
    })
}
