use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-listing async locks serializing conflict check + write inside this process.
///
/// Writers in other processes sharing the database are not covered.
#[derive(Default)]
pub struct ListingLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ListingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, listing_id: Uuid) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the DashMap shard guard is released before awaiting
        let lock = self
            .locks
            .entry(listing_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry for a deleted listing.
    pub fn forget(&self, listing_id: Uuid) {
        self.locks.remove(&listing_id);
    }
}
