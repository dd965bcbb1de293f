//! Shared API request/response types
//!
//! Used by both the coordination engine (huddle-ce) and the client
//! reconciliation library (huddle-cl), so the wire contract lives in one
//! place.

use crate::db::models::ActionItemStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /interests request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub user_id: Uuid,
    pub venue_id: Uuid,
}

/// POST /interests response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub now_interested: bool,
    /// Present when the toggle crossed the activation threshold
    pub action_item: Option<ActionItemDelta>,
}

/// What the threshold coordinator did in response to an interest change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionItemDelta {
    /// An upward crossing created a new pending item
    Created {
        action_item_id: Uuid,
        code: String,
        user_ids: Vec<Uuid>,
        message: String,
    },
    /// A downward crossing voided the pending item
    Canceled {
        action_item_id: Uuid,
        message: String,
    },
}

/// Venue list entry with its live interest count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub address: String,
    pub interested_count: i64,
}

/// GET /venues response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenuesResponse {
    pub venues: Vec<VenueSummary>,
}

/// Abbreviated user as shown on a venue detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestedUser {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: String,
}

/// GET /venues/:id response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueDetail {
    pub venue: VenueSummary,
    pub description: String,
    pub interested_users: Vec<InterestedUser>,
    /// Whether the requesting user (if given) holds an interest edge here
    pub already_interested: Option<bool>,
    /// The venue's current pending action item, if any
    pub action_item: Option<ActionItemInfo>,
}

/// GET /users/:id response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
    pub categories: Vec<String>,
    pub interested_venues: Vec<VenueSummary>,
}

/// Weighted score components, each on a 0-100 sub-scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub popularity: f64,
    pub category_match: f64,
    pub friend_signal: f64,
    pub proximity: f64,
}

/// One scored venue in a recommendation list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub venue: VenueSummary,
    /// Total score in [0, 10]
    pub score: f64,
    pub reason: String,
    pub already_interested: bool,
    pub friends_interested: i64,
    pub total_interested: i64,
    pub breakdown: ScoreBreakdown,
}

/// GET /recommendations response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendationResult>,
}

/// Full action item as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItemInfo {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub code: String,
    pub status: ActionItemStatus,
    pub user_ids: Vec<Uuid>,
    pub party_size: usize,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// GET /action-items and GET /action-items/archived response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItemsResponse {
    pub action_items: Vec<ActionItemInfo>,
}

/// Request body for action-item completion/dismissal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRequest {
    pub user_id: Uuid,
}

/// POST /action-items/expire response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpireResponse {
    pub expired_ids: Vec<Uuid>,
}

/// Generic success acknowledgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// JSON error body returned for all non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
