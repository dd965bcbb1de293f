//! # Huddle Common Library
//!
//! Shared code for the Huddle services including:
//! - Error taxonomy
//! - Database schema, models, and initialization
//! - API request/response types
//! - Engine event types (EngineEvent enum)
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
