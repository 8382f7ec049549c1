//! TTL-bounded snapshot store keyed by board id
//!
//! DashMap gives per-entry locking: `put` is an atomic replace, and a `get`
//! racing a `put` observes the old or the new snapshot, never a torn one.

use crate::cache::snapshot::CachedSnapshot;
use dashmap::DashMap;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default maximum snapshot age (30 seconds)
pub const DEFAULT_TTL: Duration = Duration::from_millis(30_000);

/// In-memory store of board snapshots with lazy TTL expiry
#[derive(Debug)]
pub struct SnapshotCache {
    entries: DashMap<String, CachedSnapshot>,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the entry for `board_id` only while it is within the TTL
    /// window. An expired entry is removed on the way out (lazy expiry).
    pub fn get(&self, board_id: &str) -> Option<CachedSnapshot> {
        let expired = match self.entries.get(board_id) {
            Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(board_id);
            debug!(board_id, "expired snapshot evicted");
        }
        None
    }

    /// Store a freshly fetched payload, replacing any prior entry wholesale.
    pub fn put(&self, board_id: &str, payload: Value) -> CachedSnapshot {
        let snapshot = CachedSnapshot::capture(board_id, payload);
        self.entries.insert(board_id.to_owned(), snapshot.clone());
        debug!(board_id, fingerprint = %snapshot.fingerprint, "snapshot stored");
        snapshot
    }

    /// Remove the named entry. Returns whether one existed.
    pub fn invalidate(&self, board_id: &str) -> bool {
        self.entries.remove(board_id).is_some()
    }

    /// Empty the store. Returns the number of entries evicted.
    pub fn invalidate_all(&self) -> usize {
        let evicted = self.entries.len();
        self.entries.clear();
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}
