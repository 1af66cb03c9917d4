use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per trip id. Holding the guard serializes every
/// check-write-reprice sequence on that trip.
#[derive(Default)]
pub struct TripLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl TripLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, trip_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on are dropped
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(trip_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}
