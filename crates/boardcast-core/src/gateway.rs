//! Mutation gateway
//!
//! The one object the HTTP layer talks to. Every mutation performs exactly
//! one upstream call; on success the cache is invalidated *before* the
//! change is broadcast, so a read racing the notification can never observe
//! a pre-mutation snapshot. On failure nothing is invalidated and nothing
//! is broadcast.

use crate::cache::{CachedSnapshot, SnapshotCache};
use crate::config::ProxyConfig;
use crate::error::Result;
use crate::event::{EventBus, ProxyEvent};
use crate::invalidate::Invalidator;
use crate::normalize::{normalize, CanonicalEvent};
use crate::upstream::{CardPatch, TrelloClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Whether a list read was served from cache or fetched upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// Proxy core: upstream client + snapshot cache + invalidation + fan-out.
///
/// Constructed once at startup and shared behind an `Arc`; torn down with
/// the process. All state is in-memory and volatile.
pub struct Gateway {
    client: TrelloClient,
    cache: Arc<SnapshotCache>,
    invalidator: Invalidator,
    bus: EventBus,
}

impl Gateway {
    pub fn new(client: TrelloClient, cache_ttl: Duration) -> Self {
        let cache = Arc::new(SnapshotCache::new(cache_ttl));
        let invalidator = Invalidator::new(Arc::clone(&cache));
        Self {
            client,
            cache,
            invalidator,
            bus: EventBus::default_capacity(),
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        let client = TrelloClient::new(&config.api_base, &config.api_key, &config.api_token);
        Self::new(client, config.cache_ttl)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Create a card, then invalidate and broadcast `taskCreated`.
    pub async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: Option<&str>,
    ) -> Result<Value> {
        let body = self.client.create_card(list_id, name, desc).await?;
        self.invalidator.on_mutation_success(None);
        self.bus.publish(ProxyEvent::TaskCreated(body.clone()));
        Ok(body)
    }

    /// Update a card, then invalidate and broadcast `taskUpdated`.
    pub async fn update_card(&self, card_id: &str, patch: &CardPatch) -> Result<Value> {
        let body = self.client.update_card(card_id, patch).await?;
        self.invalidator.on_mutation_success(None);
        self.bus.publish(ProxyEvent::TaskUpdated(body.clone()));
        Ok(body)
    }

    /// Archive a card (update with the closed flag), then invalidate and
    /// broadcast `taskDeleted` carrying the card id.
    pub async fn archive_card(&self, card_id: &str) -> Result<Value> {
        let body = self.client.archive_card(card_id).await?;
        self.invalidator.on_mutation_success(None);
        self.bus
            .publish(ProxyEvent::TaskDeleted(json!({ "cardId": card_id })));
        Ok(json!({
            "message": "Card archived",
            "cardId": card_id,
            "data": body,
        }))
    }

    /// Create a board, then invalidate and broadcast `boardCreated`.
    pub async fn create_board(&self, name: &str, default_lists: Option<bool>) -> Result<Value> {
        let body = self.client.create_board(name, default_lists).await?;
        self.invalidator.on_mutation_success(None);
        self.bus.publish(ProxyEvent::BoardCreated(body.clone()));
        Ok(body)
    }

    /// Register a webhook upstream. Not a board mutation: no invalidation,
    /// no broadcast.
    pub async fn register_webhook(
        &self,
        callback_url: &str,
        id_model: &str,
        description: Option<&str>,
    ) -> Result<Value> {
        self.client
            .register_webhook(callback_url, id_model, description)
            .await
    }

    /// Read a board's lists, serving from cache while fresh. On a miss the
    /// upstream result is stored and served; two concurrent misses may both
    /// fetch, and the last store wins.
    pub async fn board_lists(&self, board_id: &str) -> Result<(CachedSnapshot, CacheOutcome)> {
        if let Some(snapshot) = self.cache.get(board_id) {
            debug!(board_id, "serving lists from cache");
            return Ok((snapshot, CacheOutcome::Hit));
        }

        let payload = self.client.board_lists(board_id).await?;
        let snapshot = self.cache.put(board_id, payload);
        Ok((snapshot, CacheOutcome::Miss))
    }

    /// Ingest a webhook delivery: invalidate, rebroadcast the raw payload,
    /// and broadcast the canonical event when the payload carries an action.
    ///
    /// Never fails; a payload with no recognizable structure still
    /// invalidates and is still rebroadcast.
    pub fn ingest_webhook(&self, payload: Value) -> Option<CanonicalEvent> {
        self.invalidator.on_external_notification();

        let canonical = payload.get("action").map(normalize);
        self.bus.publish(ProxyEvent::WebhookReceived(payload));
        if let Some(event) = &canonical {
            debug!(kind = ?event.kind, board_id = ?event.board_id, "webhook normalized");
            self.bus.publish(ProxyEvent::BoardChanged(event.clone()));
        }
        canonical
    }

    /// Eagerly fetch and cache the configured boards. Individual failures
    /// are logged and skipped; warm-up never aborts startup.
    pub async fn warm_cache(&self, boards: &[String]) {
        for board_id in boards {
            match self.client.board_lists(board_id).await {
                Ok(payload) => {
                    self.cache.put(board_id, payload);
                    info!(board_id, "cache warmed");
                }
                Err(err) => warn!(board_id, error = %err, "cache warm-up fetch failed"),
            }
        }
    }
}
