//! Client-side mirror of the local user's interest set
//!
//! A cache with a rollback contract, not a source of truth: every mutation
//! is either confirmed by the server or flipped back by the session.

use std::collections::HashSet;
use uuid::Uuid;

/// The set of venues the local user currently believes they are
/// interested in.
#[derive(Debug, Clone, Default)]
pub struct ClientInterestView {
    interested: HashSet<Uuid>,
}

impl ClientInterestView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_interested(&self, venue_id: Uuid) -> bool {
        self.interested.contains(&venue_id)
    }

    pub fn interested_venues(&self) -> Vec<Uuid> {
        self.interested.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.interested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interested.is_empty()
    }

    /// Flip local membership; returns the new membership state.
    pub(crate) fn flip(&mut self, venue_id: Uuid) -> bool {
        if self.interested.remove(&venue_id) {
            false
        } else {
            self.interested.insert(venue_id);
            true
        }
    }

    /// Force membership to a known server-confirmed value.
    pub(crate) fn set(&mut self, venue_id: Uuid, interested: bool) {
        if interested {
            self.interested.insert(venue_id);
        } else {
            self.interested.remove(&venue_id);
        }
    }

    /// Replace the whole view with authoritative server state.
    pub(crate) fn replace(&mut self, venues: impl IntoIterator<Item = Uuid>) {
        self.interested = venues.into_iter().collect();
    }
}
