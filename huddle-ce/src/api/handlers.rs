//! HTTP request handlers
//!
//! Thin layer over the ledger, coordinator, scorer, and action item store:
//! extract, call, map errors to status codes.

use crate::state::AppState;
use crate::{actions, coordinator, db, ledger, recommend};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use huddle_common::api::types::{
    ActionItemInfo, ActionItemsResponse, ActorRequest, ErrorResponse, ExpireResponse,
    InterestedUser, RecommendationsResponse, StatusResponse, ToggleRequest, ToggleResponse,
    UserProfile, VenueDetail, VenueSummary, VenuesResponse,
};
use huddle_common::db::models::ActionItem;
use huddle_common::events::EngineEvent;
use huddle_common::Error;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

/// Error wrapper mapping the common taxonomy onto HTTP status codes
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::InvalidState(_) => StatusCode::CONFLICT,
            Error::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self.0);
        } else {
            warn!("request rejected: {}", self.0);
        }

        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct OptionalUserQuery {
    pub user_id: Option<Uuid>,
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "huddle-ce",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /venues - catalog with live interest counts
pub async fn list_venues(
    State(state): State<std::sync::Arc<AppState>>,
) -> ApiResult<Json<VenuesResponse>> {
    let venues = db::catalog::list_venues(&state.db).await?;

    let mut summaries = Vec::with_capacity(venues.len());
    for venue in venues {
        let interested_count = ledger::count(&state.db, venue.guid).await?;
        summaries.push(VenueSummary {
            id: venue.guid,
            name: venue.name,
            category: venue.category,
            image_url: venue.image_url,
            address: venue.address,
            interested_count,
        });
    }

    Ok(Json(VenuesResponse { venues: summaries }))
}

/// GET /venues/:venue_id - detail, interested users, pending action item.
///
/// With a `user_id` query parameter the response also says whether that
/// user already holds an interest edge here; recommendation lists exclude
/// such venues, so this is where `already_interested` surfaces.
pub async fn venue_detail(
    State(state): State<std::sync::Arc<AppState>>,
    Path(venue_id): Path<Uuid>,
    Query(query): Query<OptionalUserQuery>,
) -> ApiResult<Json<VenueDetail>> {
    let venue = db::catalog::get_venue(&state.db, venue_id).await?;
    let interested_count = ledger::count(&state.db, venue_id).await?;

    let interested_users = db::catalog::users_interested_in(&state.db, venue_id)
        .await?
        .into_iter()
        .map(|user| InterestedUser {
            id: user.guid,
            name: user.name,
            avatar_url: user.avatar_url,
        })
        .collect();

    let already_interested = match query.user_id {
        Some(user_id) => Some(
            ledger::venue_ids_for_user(&state.db, user_id)
                .await?
                .contains(&venue_id),
        ),
        None => None,
    };

    let action_item = db::action_items::pending_for_venue(&state.db, venue_id)
        .await?
        .map(item_info);

    Ok(Json(VenueDetail {
        venue: VenueSummary {
            id: venue.guid,
            name: venue.name,
            category: venue.category,
            image_url: venue.image_url,
            address: venue.address,
            interested_count,
        },
        description: venue.description,
        interested_users,
        already_interested,
        action_item,
    }))
}

/// GET /users/:user_id - profile with interested venues
pub async fn user_profile(
    State(state): State<std::sync::Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserProfile>> {
    let user = db::catalog::get_user(&state.db, user_id).await?;

    let interested_venues = db::catalog::venues_interested_by(&state.db, user_id)
        .await?
        .into_iter()
        .map(|(venue, interested_count)| VenueSummary {
            id: venue.guid,
            name: venue.name,
            category: venue.category,
            image_url: venue.image_url,
            address: venue.address,
            interested_count,
        })
        .collect();

    Ok(Json(UserProfile {
        id: user.guid,
        name: user.name,
        avatar_url: user.avatar_url,
        bio: user.bio,
        categories: user.categories,
        interested_venues,
    }))
}

/// POST /interests - toggle interest, coordinate the threshold
pub async fn toggle_interest(
    State(state): State<std::sync::Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<ToggleResponse>> {
    let report = coordinator::apply_toggle(&state, request.user_id, request.venue_id).await?;
    Ok(Json(ToggleResponse {
        success: true,
        now_interested: report.now_interested,
        action_item: report.delta,
    }))
}

/// GET /recommendations?user_id= - sorted, already-interested excluded
pub async fn recommendations(
    State(state): State<std::sync::Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let recommendations = recommend::recommendations(&state.db, &state.config, query.user_id).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// GET /action-items?user_id= - pending items covering the user
pub async fn list_action_items(
    State(state): State<std::sync::Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<ActionItemsResponse>> {
    db::catalog::get_user(&state.db, query.user_id).await?;
    let items = actions::list_pending_for_user(&state.db, query.user_id).await?;
    Ok(Json(ActionItemsResponse {
        action_items: items.into_iter().map(item_info).collect(),
    }))
}

/// GET /action-items/archived?user_id=
pub async fn list_archived(
    State(state): State<std::sync::Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<ActionItemsResponse>> {
    db::catalog::get_user(&state.db, query.user_id).await?;
    let items = actions::list_archived_for_user(&state.db, query.user_id).await?;
    Ok(Json(ActionItemsResponse {
        action_items: items.into_iter().map(item_info).collect(),
    }))
}

/// POST /action-items/:item_id/complete
pub async fn complete_item(
    State(state): State<std::sync::Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<StatusResponse>> {
    actions::complete(&state.db, item_id, request.user_id).await?;
    Ok(Json(StatusResponse { status: "ok".to_string() }))
}

/// POST /action-items/:item_id/dismiss
pub async fn dismiss_item(
    State(state): State<std::sync::Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<StatusResponse>> {
    actions::dismiss(&state.db, item_id, request.user_id).await?;
    Ok(Json(StatusResponse { status: "ok".to_string() }))
}

/// DELETE /action-items/:item_id - archived items only, irreversible
pub async fn delete_archived(
    State(state): State<std::sync::Arc<AppState>>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    actions::delete_permanently(&state.db, item_id).await?;
    Ok(Json(StatusResponse { status: "ok".to_string() }))
}

/// POST /action-items/expire - on-demand expiration sweep
pub async fn expire_stale(
    State(state): State<std::sync::Arc<AppState>>,
) -> ApiResult<Json<ExpireResponse>> {
    let expired_ids = actions::expire_stale(&state.db, Utc::now()).await?;
    if !expired_ids.is_empty() {
        state.broadcast_event(EngineEvent::ActionItemsExpired {
            action_item_ids: expired_ids.clone(),
            timestamp: Utc::now(),
        });
    }
    Ok(Json(ExpireResponse { expired_ids }))
}

fn item_info(item: ActionItem) -> ActionItemInfo {
    ActionItemInfo {
        id: item.guid,
        venue_id: item.venue_guid,
        code: item.code,
        status: item.status,
        party_size: item.user_guids.len(),
        user_ids: item.user_guids,
        created_at: item.created_at,
        archived_at: item.archived_at,
    }
}
