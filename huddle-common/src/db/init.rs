//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers while one writer is active; the busy
    // timeout covers the writer hand-off window.
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_users_table(&pool).await?;
    create_venues_table(&pool).await?;
    create_interests_table(&pool).await?;
    create_action_items_table(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            avatar_url TEXT NOT NULL DEFAULT '',
            bio TEXT NOT NULL DEFAULT '',
            categories TEXT NOT NULL DEFAULT '[]',
            friend_guids TEXT NOT NULL DEFAULT '[]',
            lat REAL NOT NULL DEFAULT 0,
            lon REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_venues_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS venues (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image_url TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            lat REAL NOT NULL DEFAULT 0,
            lon REAL NOT NULL DEFAULT 0,
            popularity_baseline REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_interests_table(pool: &SqlitePool) -> Result<()> {
    // The composite primary key is the at-most-one-live-edge invariant.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interests (
            user_guid TEXT NOT NULL,
            venue_guid TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_guid, venue_guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_interests_venue ON interests(venue_guid)")
        .execute(pool)
        .await?;
    Ok(())
}

async fn create_action_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS action_items (
            guid TEXT PRIMARY KEY,
            venue_guid TEXT NOT NULL,
            user_guids TEXT NOT NULL,
            code TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            archived_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Database-level backstop for the one-pending-item-per-venue invariant.
    // A coordinator that loses an insert race sees a unique violation and
    // re-derives crossing state from the fresh count.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_action_items_one_pending
        ON action_items(venue_guid) WHERE status = 'pending'
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
