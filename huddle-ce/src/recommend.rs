//! Recommendation scoring
//!
//! `score` is a pure function over (user, venue, ledger snapshot): no I/O,
//! deterministic, always in [0, 10]. `recommendations` assembles the sorted
//! list the API returns.
//!
//! Weights are design constants, not user-configurable. Popularity
//! saturates after a handful of interested users on purpose: early momentum
//! matters more than raw scale.

use crate::{db, ledger};
use huddle_common::api::types::{
    RecommendationResult, ScoreBreakdown, VenueSummary,
};
use huddle_common::config::EngineConfig;
use huddle_common::db::models::{User, Venue};
use huddle_common::Result;
use sqlx::{Pool, Sqlite};
use std::cmp::Ordering;
use uuid::Uuid;

pub const WEIGHT_POPULARITY: f64 = 0.30;
pub const WEIGHT_CATEGORY: f64 = 0.25;
pub const WEIGHT_FRIENDS: f64 = 0.25;
pub const WEIGHT_PROXIMITY: f64 = 0.20;

/// Interested users at which the popularity component saturates
const POPULARITY_SATURATION: f64 = 3.0;
/// Interested friends at which the friend component saturates
const FRIEND_SATURATION: f64 = 3.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Ledger snapshot for one venue, as seen by one user
#[derive(Debug, Clone, Copy)]
pub struct VenueSnapshot {
    /// Interested users other than the scoring user
    pub others_interested: i64,
    /// Interested users within the scoring user's friend scope
    pub friends_interested: i64,
    /// All interested users, including the scoring user
    pub total_interested: i64,
}

/// A scored venue before list assembly
#[derive(Debug, Clone)]
pub struct Scored {
    /// Total score in [0, 10]
    pub score: f64,
    pub reason: String,
    pub breakdown: ScoreBreakdown,
}

/// Score one venue for one user against a ledger snapshot.
pub fn score(
    user: &User,
    venue: &Venue,
    snapshot: VenueSnapshot,
    proximity_cutoff_km: f64,
) -> Scored {
    let popularity = (snapshot.others_interested as f64 / POPULARITY_SATURATION).min(1.0);
    let category = if category_matches(user, venue) { 1.0 } else { 0.0 };
    let friends = (snapshot.friends_interested as f64 / FRIEND_SATURATION).min(1.0);
    let distance_km = haversine_km(user.lat, user.lon, venue.lat, venue.lon);
    let proximity = proximity_component(distance_km, proximity_cutoff_km);

    let weighted = popularity * WEIGHT_POPULARITY
        + category * WEIGHT_CATEGORY
        + friends * WEIGHT_FRIENDS
        + proximity * WEIGHT_PROXIMITY;

    Scored {
        score: (weighted * 10.0).clamp(0.0, 10.0),
        reason: reason_text(popularity, category, friends, proximity, snapshot.friends_interested),
        breakdown: ScoreBreakdown {
            popularity: (popularity * 100.0).round(),
            category_match: (category * 100.0).round(),
            friend_signal: (friends * 100.0).round(),
            proximity: (proximity * 100.0).round(),
        },
    }
}

/// Assemble the sorted recommendation list for a user.
///
/// Venues the user already holds an interest edge for are excluded; they
/// surface with `already_interested = true` on venue detail instead.
pub async fn recommendations(
    db: &Pool<Sqlite>,
    config: &EngineConfig,
    user_id: Uuid,
) -> Result<Vec<RecommendationResult>> {
    let user = db::catalog::get_user(db, user_id).await?;
    let venues = db::catalog::list_venues(db).await?;
    let mine: Vec<Uuid> = ledger::venue_ids_for_user(db, user_id).await?;

    let mut results = Vec::new();
    for venue in venues {
        if mine.contains(&venue.guid) {
            continue;
        }

        let snapshot = VenueSnapshot {
            others_interested: ledger::count_excluding(db, venue.guid, user_id).await?,
            friends_interested: ledger::friends_interested_count(
                db,
                venue.guid,
                &user,
                config.friend_scope,
            )
            .await?,
            total_interested: ledger::count(db, venue.guid).await?,
        };

        let scored = score(&user, &venue, snapshot, config.proximity_cutoff_km);
        results.push(RecommendationResult {
            venue: VenueSummary {
                id: venue.guid,
                name: venue.name,
                category: venue.category,
                image_url: venue.image_url,
                address: venue.address,
                interested_count: snapshot.total_interested,
            },
            score: scored.score,
            reason: scored.reason,
            already_interested: false,
            friends_interested: snapshot.friends_interested,
            total_interested: snapshot.total_interested,
            breakdown: scored.breakdown,
        });
    }

    sort_recommendations(&mut results);
    Ok(results)
}

/// Score descending, ties by live interest count descending, then venue id
/// for determinism.
pub fn sort_recommendations(results: &mut [RecommendationResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_interested.cmp(&a.total_interested))
            .then_with(|| a.venue.id.cmp(&b.venue.id))
    });
}

/// Binary category match: full credit or none, no partial credit.
fn category_matches(user: &User, venue: &Venue) -> bool {
    let venue_category = venue.category.to_lowercase();
    user.categories.iter().any(|c| {
        let c = c.to_lowercase();
        venue_category.contains(&c) || c.contains(&venue_category)
    })
}

/// Linear falloff with distance, zero at and beyond the cutoff.
fn proximity_component(distance_km: f64, cutoff_km: f64) -> f64 {
    if distance_km >= cutoff_km {
        0.0
    } else {
        1.0 - distance_km / cutoff_km
    }
}

/// Great-circle distance between two coordinates
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Render the dominant non-zero components into a short explanation.
fn reason_text(
    popularity: f64,
    category: f64,
    friends: f64,
    proximity: f64,
    friends_interested: i64,
) -> String {
    let mut parts: Vec<(f64, String)> = Vec::new();
    if friends > 0.0 {
        let plural = if friends_interested == 1 { "" } else { "s" };
        parts.push((
            friends * WEIGHT_FRIENDS,
            format!("{friends_interested} friend{plural} interested"),
        ));
    }
    if category > 0.0 {
        parts.push((category * WEIGHT_CATEGORY, "Matches your interests".to_string()));
    }
    if popularity > 0.0 {
        parts.push((popularity * WEIGHT_POPULARITY, "Popular right now".to_string()));
    }
    if proximity > 0.0 {
        parts.push((proximity * WEIGHT_PROXIMITY, "Nearby".to_string()));
    }

    parts.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    if parts.is_empty() {
        "New venue to explore".to_string()
    } else {
        parts
            .into_iter()
            .take(2)
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
