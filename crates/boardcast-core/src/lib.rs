//! boardcast-core - Core library for boardcast
//!
//! Snapshot cache, webhook normalization, invalidation policy, event
//! fan-out, and the mutation gateway against the upstream task-board API.

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod invalidate;
pub mod normalize;
pub mod upstream;

pub use cache::{CachedSnapshot, SnapshotCache};
pub use config::ProxyConfig;
pub use error::CoreError;
pub use event::{EventBus, ProxyEvent};
pub use gateway::{CacheOutcome, Gateway};
pub use invalidate::Invalidator;
pub use normalize::{normalize, CanonicalEvent, CardSummary, EventKind};
pub use upstream::{CardPatch, TrelloClient};
