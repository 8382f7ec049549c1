//! Cache invalidation policy
//!
//! Upstream mutation responses do not reliably name the board they touched,
//! so both triggers evict the entire cache: staleness-avoidance wins over
//! hit rate. A board-scoped eviction would be an optimization only;
//! correctness never depends on it.

use crate::cache::SnapshotCache;
use std::sync::Arc;
use tracing::debug;

/// Decides which cache entries to evict for every mutating operation or
/// inbound notification
#[derive(Debug, Clone)]
pub struct Invalidator {
    cache: Arc<SnapshotCache>,
}

impl Invalidator {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }

    /// A mutation against the upstream API succeeded. The board id, when
    /// known, is recorded in the log line but does not narrow eviction.
    pub fn on_mutation_success(&self, board_id: Option<&str>) {
        let evicted = self.cache.invalidate_all();
        debug!(
            board_id = board_id.unwrap_or("-"),
            evicted, "cache invalidated after mutation"
        );
    }

    /// An external change notification arrived (webhook delivery).
    pub fn on_external_notification(&self) {
        let evicted = self.cache.invalidate_all();
        debug!(evicted, "cache invalidated after external notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn seeded_cache() -> Arc<SnapshotCache> {
        let cache = Arc::new(SnapshotCache::new(Duration::from_secs(30)));
        cache.put("B1", json!([{ "id": "L1" }]));
        cache.put("B2", json!([{ "id": "L2" }]));
        cache
    }

    #[test]
    fn test_mutation_success_empties_cache() {
        let cache = seeded_cache();
        let invalidator = Invalidator::new(Arc::clone(&cache));

        invalidator.on_mutation_success(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_scoped_mutation_still_evicts_everything() {
        let cache = seeded_cache();
        let invalidator = Invalidator::new(Arc::clone(&cache));

        invalidator.on_mutation_success(Some("B1"));
        assert!(cache.get("B1").is_none());
        assert!(cache.get("B2").is_none());
    }

    #[test]
    fn test_external_notification_empties_cache() {
        let cache = seeded_cache();
        let invalidator = Invalidator::new(Arc::clone(&cache));

        invalidator.on_external_notification();
        assert!(cache.is_empty());
    }
}
