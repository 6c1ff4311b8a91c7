//! Per-room ordering of chat persistence, liveness updates and channel joins.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomId;

/// One async lock per room.
///
/// Chat sends hold it across persist + broadcast, and a joining viewer holds it
/// across history read + channel join, so every message reaches a joiner
/// exactly once (in the snapshot or as a later broadcast) and broadcasts
/// follow persistence order. Ingest webhooks hold it across the liveness
/// update and its status event. Unrelated rooms never contend.
#[derive(Default)]
pub struct RoomSequencer {
    locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `room_id`.
    pub async fn lock(&self, room_id: &RoomId) -> OwnedMutexGuard<()> {
        // shard guard を await の前に手放す
        let lock = self.locks.entry(*room_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Number of rooms that have been sequenced so far.
    pub fn room_count(&self) -> usize {
        self.locks.len()
    }
}
