//! Interest edge queries
//!
//! Raw storage operations on the interests table. The Interest Ledger
//! (`crate::ledger`) layers toggle semantics and retry policy on top.

use chrono::{DateTime, Utc};
use huddle_common::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

/// Whether a live edge exists for (user, venue)
pub async fn exists(db: &Pool<Sqlite>, user_id: Uuid, venue_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM interests WHERE user_guid = ? AND venue_guid = ?)",
    )
    .bind(user_id.to_string())
    .bind(venue_id.to_string())
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Insert a new edge. The composite primary key rejects duplicates.
pub async fn insert(
    db: &Pool<Sqlite>,
    user_id: Uuid,
    venue_id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("INSERT INTO interests (user_guid, venue_guid, created_at) VALUES (?, ?, ?)")
        .bind(user_id.to_string())
        .bind(venue_id.to_string())
        .bind(created_at.to_rfc3339())
        .execute(db)
        .await?;
    Ok(())
}

/// Remove the edge for (user, venue). Removing a missing edge is a no-op.
pub async fn remove(db: &Pool<Sqlite>, user_id: Uuid, venue_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM interests WHERE user_guid = ? AND venue_guid = ?")
        .bind(user_id.to_string())
        .bind(venue_id.to_string())
        .execute(db)
        .await?;
    Ok(())
}

/// Live interest count for a venue
pub async fn count(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interests WHERE venue_guid = ?")
        .bind(venue_id.to_string())
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Live interest count for a venue, excluding one user
pub async fn count_excluding(db: &Pool<Sqlite>, venue_id: Uuid, user_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM interests WHERE venue_guid = ? AND user_guid != ?",
    )
    .bind(venue_id.to_string())
    .bind(user_id.to_string())
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// All users interested in a venue, oldest edge first
pub async fn interested_user_ids(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<Vec<Uuid>> {
    let guids: Vec<String> = sqlx::query_scalar(
        "SELECT user_guid FROM interests WHERE venue_guid = ? ORDER BY created_at, user_guid",
    )
    .bind(venue_id.to_string())
    .fetch_all(db)
    .await?;

    guids.iter().map(|g| super::parse_guid(g)).collect()
}

/// All venues a user is interested in
pub async fn venue_ids_for_user(db: &Pool<Sqlite>, user_id: Uuid) -> Result<Vec<Uuid>> {
    let guids: Vec<String> = sqlx::query_scalar(
        "SELECT venue_guid FROM interests WHERE user_guid = ? ORDER BY created_at, venue_guid",
    )
    .bind(user_id.to_string())
    .fetch_all(db)
    .await?;

    guids.iter().map(|g| super::parse_guid(g)).collect()
}
