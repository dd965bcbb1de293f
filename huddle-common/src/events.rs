//! Event types for the Huddle event system
//!
//! Broadcast by the coordination engine and streamed to clients over SSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Engine event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// A user toggled interest in a venue
    InterestChanged {
        user_id: Uuid,
        venue_id: Uuid,
        now_interested: bool,
        interested_count: i64,
        timestamp: DateTime<Utc>,
    },

    /// A venue crossed the activation threshold upward
    ActionItemCreated {
        action_item_id: Uuid,
        venue_id: Uuid,
        code: String,
        party_size: usize,
        timestamp: DateTime<Utc>,
    },

    /// A pending action item was voided by a downward crossing
    ActionItemCanceled {
        action_item_id: Uuid,
        venue_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The expiration sweep archived stale pending items
    ActionItemsExpired {
        action_item_ids: Vec<Uuid>,
        timestamp: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// Event type string used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::InterestChanged { .. } => "InterestChanged",
            EngineEvent::ActionItemCreated { .. } => "ActionItemCreated",
            EngineEvent::ActionItemCanceled { .. } => "ActionItemCanceled",
            EngineEvent::ActionItemsExpired { .. } => "ActionItemsExpired",
        }
    }
}
