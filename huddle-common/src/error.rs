//! Common error types for Huddle

use thiserror::Error;

/// Common result type for Huddle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Huddle services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested user, venue, or action item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation is illegal for the entity's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lost a race that requires re-reading current state before retrying
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// HTTP transport failure between client and engine
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this is a transient storage failure that is safe to retry
    /// with backoff at the ledger/store boundary.
    pub fn is_transient(&self) -> bool {
        match self {
            // SQLITE_BUSY (5) and SQLITE_LOCKED (6) clear once the
            // competing writer finishes.
            Error::Database(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("5") | Some("6"))
            }
            Error::Database(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }
}
