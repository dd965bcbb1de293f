//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person using the venue discovery app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: Uuid,
    pub name: String,
    pub avatar_url: String,
    pub bio: String,
    /// Declared interest categories (e.g. "Coffee Shop")
    pub categories: Vec<String>,
    /// Declared friend graph, maintained by the social collaborator
    pub friend_guids: Vec<Uuid>,
    pub lat: f64,
    pub lon: f64,
}

/// A place users can discover and coordinate around
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub guid: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image_url: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    /// Baseline popularity from the catalog, before live interest
    pub popularity_baseline: f64,
}

/// Lifecycle state of an action item.
///
/// `Pending` is the only live state. `Completed`, `Dismissed`, and `Expired`
/// are the archive; archived items can be permanently deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionItemStatus {
    Pending,
    Completed,
    Dismissed,
    Expired,
}

impl ActionItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionItemStatus::Pending => "pending",
            ActionItemStatus::Completed => "completed",
            ActionItemStatus::Dismissed => "dismissed",
            ActionItemStatus::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ActionItemStatus::Pending),
            "completed" => Some(ActionItemStatus::Completed),
            "dismissed" => Some(ActionItemStatus::Dismissed),
            "expired" => Some(ActionItemStatus::Expired),
            _ => None,
        }
    }

    /// Archived statuses are terminal apart from permanent deletion.
    pub fn is_archived(&self) -> bool {
        !matches!(self, ActionItemStatus::Pending)
    }
}

/// A group-coordination artifact created when a venue crosses the
/// activation threshold.
///
/// The id is unique per activation, not per venue: a venue that re-crosses
/// the threshold after its previous item left `pending` gets a fresh item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub guid: Uuid,
    pub venue_guid: Uuid,
    /// Interested-user snapshot captured at activation time
    pub user_guids: Vec<Uuid>,
    /// Human-readable confirmation code (e.g. "HDL-1a2b3c-4821")
    pub code: String,
    pub status: ActionItemStatus,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}
