//! Interest Ledger
//!
//! The authoritative set of (user, venue) interest edges. Toggle is an
//! edge flip, not a set-to-true: calling it twice returns the edge to its
//! original state, so callers must not blindly retry an unacknowledged
//! toggle without re-reading server state first.
//!
//! All storage calls go through the bounded-retry helper so transient
//! SQLite busy errors are absorbed here rather than surfaced to callers.

use crate::{db, retry};
use chrono::Utc;
use huddle_common::config::FriendScope;
use huddle_common::db::models::User;
use huddle_common::Result;
use sqlx::{Pool, Sqlite};
use tracing::debug;
use uuid::Uuid;

/// Outcome of a toggle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEffect {
    pub was_interested: bool,
    pub now_interested: bool,
}

/// Flip the (user, venue) edge: remove it if present, insert it otherwise.
///
/// Caller is responsible for existence validation and for holding the
/// venue's coordination lock when the result feeds a crossing check.
pub async fn toggle(db: &Pool<Sqlite>, user_id: Uuid, venue_id: Uuid) -> Result<ToggleEffect> {
    let was_interested =
        retry::with_backoff("interest lookup", || db::interests::exists(db, user_id, venue_id))
            .await?;

    if was_interested {
        retry::with_backoff("interest removal", || {
            db::interests::remove(db, user_id, venue_id)
        })
        .await?;
    } else {
        let created_at = Utc::now();
        retry::with_backoff("interest insert", || {
            db::interests::insert(db, user_id, venue_id, created_at)
        })
        .await?;
    }

    debug!(
        "interest toggled: user={} venue={} now_interested={}",
        user_id, venue_id, !was_interested
    );

    Ok(ToggleEffect {
        was_interested,
        now_interested: !was_interested,
    })
}

/// Live interest count for a venue
pub async fn count(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<i64> {
    retry::with_backoff("interest count", || db::interests::count(db, venue_id)).await
}

/// Live interest count excluding one user.
///
/// Recommendation scoring uses this so a user's own toggle never moves a
/// venue's score.
pub async fn count_excluding(db: &Pool<Sqlite>, venue_id: Uuid, user_id: Uuid) -> Result<i64> {
    retry::with_backoff("interest count", || {
        db::interests::count_excluding(db, venue_id, user_id)
    })
    .await
}

/// All users interested in a venue, oldest edge first
pub async fn interested_user_ids(db: &Pool<Sqlite>, venue_id: Uuid) -> Result<Vec<Uuid>> {
    retry::with_backoff("interested users", || {
        db::interests::interested_user_ids(db, venue_id)
    })
    .await
}

/// All venues a user is interested in
pub async fn venue_ids_for_user(db: &Pool<Sqlite>, user_id: Uuid) -> Result<Vec<Uuid>> {
    retry::with_backoff("interested venues", || {
        db::interests::venue_ids_for_user(db, user_id)
    })
    .await
}

/// How many of the viewer's friends are interested in a venue.
///
/// The viewer never counts toward their own friend signal.
pub async fn friends_interested_count(
    db: &Pool<Sqlite>,
    venue_id: Uuid,
    viewer: &User,
    scope: FriendScope,
) -> Result<i64> {
    match scope {
        FriendScope::AllUsers => count_excluding(db, venue_id, viewer.guid).await,
        FriendScope::DeclaredFriends => {
            let interested = interested_user_ids(db, venue_id).await?;
            Ok(interested
                .iter()
                .filter(|id| **id != viewer.guid && viewer.friend_guids.contains(id))
                .count() as i64)
        }
    }
}
