//! HTTP API integration tests
//!
//! Drives the full router with in-process requests via tower's
//! `oneshot`, backed by a scratch database per test.

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use huddle_ce::api::create_router;
use huddle_ce::coordinator;
use huddle_common::api::types::{
    ActionItemsResponse, ErrorResponse, ExpireResponse, RecommendationsResponse, ToggleResponse,
    UserProfile, VenueDetail, VenuesResponse,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn router(engine: &helpers::TestEngine) -> Router {
    create_router(Arc::clone(&engine.state))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.expect("infallible");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, body.to_vec())
}

async fn get_json<T: DeserializeOwned>(router: Router, uri: &str) -> (StatusCode, T) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let (status, body) = send(router, request).await;
    let parsed = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("decode {uri}: {e}: {}", String::from_utf8_lossy(&body)));
    (status, parsed)
}

async fn post_json<T: DeserializeOwned>(
    router: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, T) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    let (status, body) = send(router, request).await;
    let parsed = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("decode {uri}: {e}: {}", String::from_utf8_lossy(&body)));
    (status, parsed)
}

#[tokio::test]
async fn health_reports_ok() {
    let engine = helpers::setup().await;
    let (status, body): (_, serde_json::Value) = get_json(router(&engine), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn venues_list_carries_live_counts() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 2).await;
    let venue = helpers::seed_venue(&engine, "Counted Cafe", "Coffee Shop").await;
    helpers::seed_venue(&engine, "Empty Cafe", "Coffee Shop").await;

    for user in &users {
        coordinator::apply_toggle(&engine.state, *user, venue)
            .await
            .unwrap();
    }

    let (status, body): (_, VenuesResponse) = get_json(router(&engine), "/venues").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.venues.len(), 2);

    let counted = body
        .venues
        .iter()
        .find(|v| v.id == venue)
        .expect("venue in list");
    assert_eq!(counted.interested_count, 2);
}

#[tokio::test]
async fn toggle_endpoint_reports_threshold_crossing() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 3).await;
    let venue = helpers::seed_venue(&engine, "Wire Cafe", "Coffee Shop").await;

    for user in &users[..2] {
        let (status, body): (_, ToggleResponse) = post_json(
            router(&engine),
            "/interests",
            json!({ "user_id": user, "venue_id": venue }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.now_interested);
        assert!(body.action_item.is_none());
    }

    let (status, body): (_, ToggleResponse) = post_json(
        router(&engine),
        "/interests",
        json!({ "user_id": users[2], "venue_id": venue }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.action_item.is_some(), "third toggle crosses the threshold");
}

#[tokio::test]
async fn toggle_unknown_venue_is_404() {
    let engine = helpers::setup().await;
    let user = helpers::seed_users(&engine, 1).await[0];

    let (status, body): (_, ErrorResponse) = post_json(
        router(&engine),
        "/interests",
        json!({ "user_id": user, "venue_id": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.error.contains("venue"));
}

#[tokio::test]
async fn venue_detail_flags_existing_interest() {
    let engine = helpers::setup().await;
    let user = helpers::seed_users(&engine, 1).await[0];
    let venue = helpers::seed_venue(&engine, "Detail Cafe", "Coffee Shop").await;
    coordinator::apply_toggle(&engine.state, user, venue)
        .await
        .unwrap();

    let uri = format!("/venues/{venue}?user_id={user}");
    let (status, body): (_, VenueDetail) = get_json(router(&engine), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.already_interested, Some(true));
    assert_eq!(body.interested_users.len(), 1);
    assert_eq!(body.interested_users[0].id, user);

    // Without a user_id the flag is absent rather than false.
    let (_, anonymous): (_, VenueDetail) =
        get_json(router(&engine), &format!("/venues/{venue}")).await;
    assert_eq!(anonymous.already_interested, None);
}

#[tokio::test]
async fn user_profile_lists_interested_venues_with_counts() {
    let engine = helpers::setup().await;
    let user = helpers::seed_users(&engine, 1).await[0];
    let friend = helpers::seed_users(&engine, 1).await[0];
    let cafe = helpers::seed_venue(&engine, "Profile Cafe", "Coffee Shop").await;
    let books = helpers::seed_venue(&engine, "Profile Books", "Bookstore").await;
    helpers::seed_venue(&engine, "Untouched", "Art Gallery").await;

    coordinator::apply_toggle(&engine.state, user, cafe).await.unwrap();
    coordinator::apply_toggle(&engine.state, user, books).await.unwrap();
    coordinator::apply_toggle(&engine.state, friend, cafe).await.unwrap();

    let (status, body): (_, UserProfile) =
        get_json(router(&engine), &format!("/users/{user}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.id, user);

    // Both interested venues, oldest edge first, with live counts.
    assert_eq!(body.interested_venues.len(), 2);
    assert_eq!(body.interested_venues[0].id, cafe);
    assert_eq!(body.interested_venues[0].interested_count, 2);
    assert_eq!(body.interested_venues[1].id, books);
    assert_eq!(body.interested_venues[1].interested_count, 1);

    let (status, _): (_, ErrorResponse) =
        get_json(router(&engine), &format!("/users/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recommendations_exclude_interested_and_sort_by_score() {
    let engine = helpers::setup().await;
    let viewer = helpers::seed_user(&engine, "viewer", &["Coffee"]).await;
    let crowd = helpers::seed_users(&engine, 2).await;
    let mine = helpers::seed_venue(&engine, "My Cafe", "Coffee Shop").await;
    let busy = helpers::seed_venue(&engine, "Busy Cafe", "Coffee Shop").await;
    let quiet = helpers::seed_venue(&engine, "Quiet Gallery", "Art Gallery").await;

    coordinator::apply_toggle(&engine.state, viewer, mine)
        .await
        .unwrap();
    for user in &crowd {
        coordinator::apply_toggle(&engine.state, *user, busy)
            .await
            .unwrap();
    }

    let uri = format!("/recommendations?user_id={viewer}");
    let (status, body): (_, RecommendationsResponse) = get_json(router(&engine), &uri).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<Uuid> = body.recommendations.iter().map(|r| r.venue.id).collect();
    assert!(!ids.contains(&mine), "interested venues are excluded");
    assert_eq!(ids, vec![busy, quiet], "popular category match outranks the rest");

    for window in body.recommendations.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
    let top = &body.recommendations[0];
    assert_eq!(top.total_interested, 2);
    assert!(top.score > 0.0 && top.score <= 10.0);
    assert!(!top.reason.is_empty());
}

#[tokio::test]
async fn action_item_endpoints_cover_the_lifecycle() {
    let engine = helpers::setup().await;
    let users = helpers::seed_users(&engine, 3).await;
    let venue = helpers::seed_venue(&engine, "Lifecycle Cafe", "Coffee Shop").await;
    for user in &users {
        coordinator::apply_toggle(&engine.state, *user, venue)
            .await
            .unwrap();
    }

    // Pending item shows up for a snapshot member.
    let uri = format!("/action-items?user_id={}", users[0]);
    let (status, body): (_, ActionItemsResponse) = get_json(router(&engine), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.action_items.len(), 1);
    let item = &body.action_items[0];
    assert_eq!(item.venue_id, venue);
    assert_eq!(item.party_size, 3);

    // Deleting while pending is refused.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/action-items/{}", item.id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(&engine), request).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Complete it, twice: second call is an idempotent no-op.
    for user in &users[..2] {
        let (status, _): (_, serde_json::Value) = post_json(
            router(&engine),
            &format!("/action-items/{}/complete", item.id),
            json!({ "user_id": user }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Gone from pending, present in the archive.
    let (_, pending): (_, ActionItemsResponse) =
        get_json(router(&engine), &format!("/action-items?user_id={}", users[0])).await;
    assert!(pending.action_items.is_empty());

    let (_, archived): (_, ActionItemsResponse) = get_json(
        router(&engine),
        &format!("/action-items/archived?user_id={}", users[0]),
    )
    .await;
    assert_eq!(archived.action_items.len(), 1);
    assert_eq!(archived.action_items[0].id, item.id);

    // Archived items can be deleted, once.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/action-items/{}", item.id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(&engine), request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/action-items/{}", item.id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(&engine), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings_for_unknown_user_are_404() {
    let engine = helpers::setup().await;
    let uri = format!("/action-items?user_id={}", Uuid::new_v4());
    let (status, _): (_, ErrorResponse) = get_json(router(&engine), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expire_endpoint_reports_swept_ids() {
    let engine = helpers::setup().await;

    // Nothing stale yet.
    let (status, body): (_, ExpireResponse) =
        post_json(router(&engine), "/action-items/expire", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.expired_ids.is_empty());
}
