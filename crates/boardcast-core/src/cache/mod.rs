//! Snapshot caching for board list reads
//!
//! Short-lived, in-memory, TTL-bounded. Expiry is checked lazily on read;
//! there is no background sweep.

pub mod snapshot;
pub mod store;

pub use snapshot::{fingerprint, CachedSnapshot};
pub use store::{SnapshotCache, DEFAULT_TTL};
