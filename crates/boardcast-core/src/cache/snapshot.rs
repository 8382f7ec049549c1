//! Cached board snapshot with content fingerprint

use chrono::{DateTime, Timelike, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// A cached copy of a board's lists-and-cards as last fetched from upstream.
///
/// Replaced wholesale on every fetch; the payload is shared behind an `Arc`
/// so clones handed to readers stay cheap.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub board_id: String,
    pub fetched_at: DateTime<Utc>,
    pub payload: Arc<Value>,
    /// Deterministic content hash of the payload, used for change detection
    /// and conditional reads
    pub fingerprint: String,
}

impl CachedSnapshot {
    /// Capture a freshly fetched payload, stamping it with the current time
    /// and its content fingerprint.
    pub fn capture(board_id: impl Into<String>, payload: Value) -> Self {
        let fingerprint = fingerprint(&payload);
        Self {
            board_id: board_id.into(),
            fetched_at: Utc::now(),
            payload: Arc::new(payload),
            fingerprint,
        }
    }

    /// Staleness: elapsed time since the upstream fetch
    pub fn age(&self) -> Duration {
        (Utc::now() - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Conditional revalidation: the caller's copy is unchanged when its
    /// fingerprint matches, or when its known freshness timestamp is at
    /// least as new as this snapshot's fetch time (compared at second
    /// precision, matching the HTTP date resolution of the read path).
    pub fn is_unchanged_for(
        &self,
        held_fingerprint: Option<&str>,
        known_fresh_at: Option<DateTime<Utc>>,
    ) -> bool {
        if held_fingerprint.is_some_and(|held| held == self.fingerprint) {
            return true;
        }
        let fetched = self
            .fetched_at
            .with_nanosecond(0)
            .unwrap_or(self.fetched_at);
        known_fresh_at.is_some_and(|known| known >= fetched)
    }
}

/// Hex SHA-256 of the payload's serialized JSON text.
///
/// serde_json orders object keys, so equal content yields an equal
/// fingerprint regardless of the order fields arrived in.
pub fn fingerprint(payload: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
