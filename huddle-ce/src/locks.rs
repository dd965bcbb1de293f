//! Per-venue mutual exclusion
//!
//! The coordinator's count-read-and-create must be atomic relative to other
//! coordinators for the *same* venue, while different venues proceed
//! independently. Locks are therefore keyed by venue id; there is no global
//! lock on the coordination path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-venue async locks.
///
/// Entries are created on first use and kept for the process lifetime,
/// bounded by the venue catalog size.
#[derive(Clone, Default)]
pub struct VenueLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl VenueLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one venue.
    ///
    /// The registry mutex is held only long enough to clone the entry; the
    /// await happens outside it, so lock acquisition for venue A never
    /// blocks lookups for venue B.
    pub async fn lock(&self, venue_id: Uuid) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().expect("venue lock registry poisoned");
            Arc::clone(
                map.entry(venue_id)
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_venue_serializes() {
        let locks = VenueLocks::new();
        let venue = Uuid::new_v4();

        let guard = locks.lock(venue).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock(venue)).await;
        assert!(second.is_err(), "second lock should block while held");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.lock(venue)).await;
        assert!(third.is_ok(), "lock should be free after release");
    }

    #[tokio::test]
    async fn different_venues_are_independent() {
        let locks = VenueLocks::new();

        let _guard_a = locks.lock(Uuid::new_v4()).await;
        let other = tokio::time::timeout(Duration::from_millis(50), locks.lock(Uuid::new_v4())).await;
        assert!(other.is_ok(), "unrelated venue must not block");
    }
}
