//! Shared test fixtures for the coordination engine
//!
//! Each test gets its own scratch SQLite database in a temp directory so
//! concurrent tests never share state.

#![allow(dead_code)]

use huddle_ce::db::catalog;
use huddle_ce::state::AppState;
use huddle_common::config::EngineConfig;
use huddle_common::db::models::{User, Venue};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestEngine {
    pub state: Arc<AppState>,
    // Keeps the database directory alive for the test's duration
    _dir: TempDir,
}

pub async fn setup() -> TestEngine {
    setup_with_config(EngineConfig::default()).await
}

pub async fn setup_with_config(mut config: EngineConfig) -> TestEngine {
    let dir = tempfile::tempdir().expect("create temp dir");
    config.database_path = dir.path().join("huddle.db");

    let pool = huddle_common::db::init_database(&config.database_path)
        .await
        .expect("init database");

    TestEngine {
        state: Arc::new(AppState::new(pool, config)),
        _dir: dir,
    }
}

/// Seed a user co-located with `seed_venue` venues, with no declared
/// friends and a single category preference.
pub async fn seed_user(engine: &TestEngine, name: &str, categories: &[&str]) -> Uuid {
    let user = User {
        guid: Uuid::new_v4(),
        name: name.to_string(),
        avatar_url: format!("https://example.com/{name}.png"),
        bio: String::new(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        friend_guids: vec![],
        lat: 40.7128,
        lon: -74.0060,
    };
    catalog::upsert_user(&engine.state.db, &user)
        .await
        .expect("seed user");
    user.guid
}

pub async fn seed_users(engine: &TestEngine, count: usize) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(seed_user(engine, &format!("user_{i}"), &["Coffee"]).await);
    }
    ids
}

pub async fn seed_venue(engine: &TestEngine, name: &str, category: &str) -> Uuid {
    let venue = Venue {
        guid: Uuid::new_v4(),
        name: name.to_string(),
        category: category.to_string(),
        description: format!("{name} description"),
        image_url: format!("https://example.com/{name}.jpg"),
        address: "1 Test Street".to_string(),
        lat: 40.7128,
        lon: -74.0060,
        popularity_baseline: 0.0,
    };
    catalog::upsert_venue(&engine.state.db, &venue)
        .await
        .expect("seed venue");
    venue.guid
}
