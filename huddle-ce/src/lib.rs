//! # Huddle Coordination Engine
//!
//! Tracks which users are interested in which venues, scores venues per
//! user, and automatically creates (and later voids) a group action item
//! when a venue's interest count crosses the activation threshold:
//! exactly once per activation, under concurrent toggles.

pub mod actions;
pub mod api;
pub mod coordinator;
pub mod db;
pub mod ledger;
pub mod locks;
pub mod recommend;
pub mod retry;
pub mod state;
