//! User and venue catalog queries
//!
//! The catalog is maintained by an external collaborator; the engine only
//! reads it. Upserts exist for provisioning and tests.

use huddle_common::db::models::{User, Venue};
use huddle_common::{Error, Result};
use sqlx::{Pool, Row, Sqlite};
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

/// Get a user by id, including declared categories and friend graph
pub async fn get_user(db: &Pool<Sqlite>, user_id: Uuid) -> Result<User> {
    let row = sqlx::query(
        "SELECT guid, name, avatar_url, bio, categories, friend_guids, lat, lon \
         FROM users WHERE guid = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;

    row_to_user(&row)
}

/// Get a venue by id
pub async fn get_venue(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<Venue> {
    let row = sqlx::query(
        "SELECT guid, name, category, description, image_url, address, lat, lon, \
                popularity_baseline \
         FROM venues WHERE guid = ?",
    )
    .bind(venue_id.to_string())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound(format!("venue {venue_id}")))?;

    row_to_venue(&row)
}

/// List the whole venue catalog, ordered by name for stable output
pub async fn list_venues(db: &Pool<Sqlite>) -> Result<Vec<Venue>> {
    let rows = sqlx::query(
        "SELECT guid, name, category, description, image_url, address, lat, lon, \
                popularity_baseline \
         FROM venues ORDER BY name",
    )
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_venue).collect()
}

/// Users holding an interest edge for a venue, oldest edge first
pub async fn users_interested_in(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<Vec<User>> {
    let rows = sqlx::query(
        "SELECT u.guid, u.name, u.avatar_url, u.bio, u.categories, u.friend_guids, \
                u.lat, u.lon \
         FROM interests i JOIN users u ON u.guid = i.user_guid \
         WHERE i.venue_guid = ? ORDER BY i.created_at, u.guid",
    )
    .bind(venue_id.to_string())
    .fetch_all(db)
    .await?;

    rows.iter().map(row_to_user).collect()
}

/// Venues a user holds an interest edge for, each with its live interest
/// count, oldest edge first
pub async fn venues_interested_by(
    db: &Pool<Sqlite>,
    user_id: Uuid,
) -> Result<Vec<(Venue, i64)>> {
    let rows = sqlx::query(
        "SELECT v.guid, v.name, v.category, v.description, v.image_url, v.address, \
                v.lat, v.lon, v.popularity_baseline, \
                (SELECT COUNT(*) FROM interests i2 WHERE i2.venue_guid = v.guid) \
                    AS interested_count \
         FROM interests i JOIN venues v ON v.guid = i.venue_guid \
         WHERE i.user_guid = ? ORDER BY i.created_at, v.guid",
    )
    .bind(user_id.to_string())
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| Ok((row_to_venue(row)?, row.get("interested_count"))))
        .collect()
}

/// Insert or replace a user record
pub async fn upsert_user(db: &Pool<Sqlite>, user: &User) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO users \
         (guid, name, avatar_url, bio, categories, friend_guids, lat, lon) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.guid.to_string())
    .bind(&user.name)
    .bind(&user.avatar_url)
    .bind(&user.bio)
    .bind(to_json(&user.categories)?)
    .bind(to_json(&user.friend_guids)?)
    .bind(user.lat)
    .bind(user.lon)
    .execute(db)
    .await?;
    Ok(())
}

/// Insert or replace a venue record
pub async fn upsert_venue(db: &Pool<Sqlite>, venue: &Venue) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO venues \
         (guid, name, category, description, image_url, address, lat, lon, \
          popularity_baseline) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(venue.guid.to_string())
    .bind(&venue.name)
    .bind(&venue.category)
    .bind(&venue.description)
    .bind(&venue.image_url)
    .bind(&venue.address)
    .bind(venue.lat)
    .bind(venue.lon)
    .bind(venue.popularity_baseline)
    .execute(db)
    .await?;
    Ok(())
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        guid: super::parse_guid(&row.get::<String, _>("guid"))?,
        name: row.get("name"),
        avatar_url: row.get("avatar_url"),
        bio: row.get("bio"),
        categories: from_json(&row.get::<String, _>("categories"))?,
        friend_guids: from_json(&row.get::<String, _>("friend_guids"))?,
        lat: row.get("lat"),
        lon: row.get("lon"),
    })
}

fn row_to_venue(row: &SqliteRow) -> Result<Venue> {
    Ok(Venue {
        guid: super::parse_guid(&row.get::<String, _>("guid"))?,
        name: row.get("name"),
        category: row.get("category"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        address: row.get("address"),
        lat: row.get("lat"),
        lon: row.get("lon"),
        popularity_baseline: row.get("popularity_baseline"),
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Internal(format!("serialize failed: {e}")))
}

fn from_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| Error::Internal(format!("invalid JSON column in database: {e}")))
}
