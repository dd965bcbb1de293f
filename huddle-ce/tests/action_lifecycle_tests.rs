//! Action item lifecycle tests
//!
//! Exercises the archive transitions, deletion rules, and the
//! time-based expiration sweep.

mod helpers;

use chrono::{Duration, Utc};
use huddle_ce::db::action_items;
use huddle_ce::{actions, coordinator};
use huddle_common::db::models::{ActionItem, ActionItemStatus};
use huddle_common::Error;
use uuid::Uuid;

/// Drive a venue to activation and return the pending item.
async fn activate(engine: &helpers::TestEngine, venue: Uuid, users: &[Uuid]) -> ActionItem {
    for user in users {
        coordinator::apply_toggle(&engine.state, *user, venue)
            .await
            .unwrap();
    }
    action_items::pending_for_venue(&engine.state.db, venue)
        .await
        .unwrap()
        .expect("activation created a pending item")
}

#[tokio::test]
async fn complete_archives_and_repeats_as_noop() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 3).await;
    let venue = helpers::seed_venue(&engine, "Done Cafe", "Coffee Shop").await;
    let item = activate(&engine, venue, &users).await;
    let db = &engine.state.db;

    actions::complete(db, item.guid, users[0]).await.unwrap();
    let stored = action_items::get(db, item.guid).await.unwrap().unwrap();
    assert_eq!(stored.status, ActionItemStatus::Completed);
    assert!(stored.archived_at.is_some());

    // Second complete and a late dismiss both leave the record alone.
    actions::complete(db, item.guid, users[1]).await.unwrap();
    actions::dismiss(db, item.guid, users[1]).await.unwrap();
    let stored = action_items::get(db, item.guid).await.unwrap().unwrap();
    assert_eq!(stored.status, ActionItemStatus::Completed);

    // The venue no longer has a pending item.
    assert!(action_items::pending_for_venue(db, venue)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn dismiss_archives_the_item() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 3).await;
    let venue = helpers::seed_venue(&engine, "Skip Cafe", "Coffee Shop").await;
    let item = activate(&engine, venue, &users).await;
    let db = &engine.state.db;

    actions::dismiss(db, item.guid, users[0]).await.unwrap();
    let stored = action_items::get(db, item.guid).await.unwrap().unwrap();
    assert_eq!(stored.status, ActionItemStatus::Dismissed);

    let archived = actions::list_archived_for_user(db, users[1]).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].guid, item.guid);
}

#[tokio::test]
async fn transition_on_missing_item_is_not_found() {
    let engine = helpers::setup().await;
    let db = &engine.state.db;

    let result = actions::complete(db, Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn delete_requires_archived_status() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 3).await;
    let venue = helpers::seed_venue(&engine, "Keep Cafe", "Coffee Shop").await;
    let item = activate(&engine, venue, &users).await;
    let db = &engine.state.db;

    // Pending items are protected.
    let result = actions::delete_permanently(db, item.guid).await;
    assert!(matches!(result, Err(Error::InvalidState(_))));
    assert!(action_items::get(db, item.guid).await.unwrap().is_some());

    // Once archived the delete goes through and is irreversible.
    actions::dismiss(db, item.guid, users[0]).await.unwrap();
    actions::delete_permanently(db, item.guid).await.unwrap();
    assert!(action_items::get(db, item.guid).await.unwrap().is_none());

    let again = actions::delete_permanently(db, item.guid).await;
    assert!(matches!(again, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn expiry_sweep_archives_only_stale_pending_items() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 3).await;
    let fresh_venue = helpers::seed_venue(&engine, "Fresh Cafe", "Coffee Shop").await;
    let stale_venue = helpers::seed_venue(&engine, "Stale Cafe", "Coffee Shop").await;
    let db = &engine.state.db;

    let fresh = activate(&engine, fresh_venue, &users).await;

    // Backdate a pending item past the expiry horizon.
    let stale = ActionItem {
        guid: Uuid::new_v4(),
        venue_guid: stale_venue,
        user_guids: users.clone(),
        code: "HDL-TEST-0001".to_string(),
        status: ActionItemStatus::Pending,
        created_at: Utc::now() - Duration::days(actions::EXPIRY_AFTER_DAYS + 1),
        archived_at: None,
    };
    action_items::insert(db, &stale).await.unwrap();

    let expired = actions::expire_stale(db, Utc::now()).await.unwrap();
    assert_eq!(expired, vec![stale.guid]);

    let stored = action_items::get(db, stale.guid).await.unwrap().unwrap();
    assert_eq!(stored.status, ActionItemStatus::Expired);
    assert!(stored.archived_at.is_some());

    let stored = action_items::get(db, fresh.guid).await.unwrap().unwrap();
    assert_eq!(stored.status, ActionItemStatus::Pending);

    // Repeat sweep finds nothing left to expire.
    let again = actions::expire_stale(db, Utc::now()).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn per_user_listings_filter_by_snapshot_membership() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 4).await;
    let venue = helpers::seed_venue(&engine, "Snapshot Cafe", "Coffee Shop").await;
    // Only the first three users are in the snapshot.
    let item = activate(&engine, venue, &users[..3]).await;
    let db = &engine.state.db;

    let member = actions::list_pending_for_user(db, users[0]).await.unwrap();
    assert_eq!(member.len(), 1);
    assert_eq!(member[0].guid, item.guid);

    let outsider = actions::list_pending_for_user(db, users[3]).await.unwrap();
    assert!(outsider.is_empty());

    // Archived listings honor the same membership rule.
    actions::complete(db, item.guid, users[0]).await.unwrap();
    assert!(actions::list_pending_for_user(db, users[0])
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        actions::list_archived_for_user(db, users[2]).await.unwrap().len(),
        1
    );
    assert!(actions::list_archived_for_user(db, users[3])
        .await
        .unwrap()
        .is_empty());
}
