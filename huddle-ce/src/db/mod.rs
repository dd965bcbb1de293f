//! Database access layer for the coordination engine
//!
//! One module per table group. All queries take a `&Pool<Sqlite>` and
//! return domain models from `huddle-common`.

pub mod action_items;
pub mod catalog;
pub mod interests;

use huddle_common::{Error, Result};
use uuid::Uuid;

/// Parse a guid column that must always hold a valid UUID.
pub(crate) fn parse_guid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("invalid guid in database: {e}")))
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| Error::Internal(format!("invalid timestamp in database: {e}")))
}
