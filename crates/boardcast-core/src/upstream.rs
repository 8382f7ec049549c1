//! Upstream task-board API client
//!
//! Thin wrapper over reqwest. Trello authenticates every call through
//! `key`/`token` query parameters, so each request gets them appended
//! centrally in [`TrelloClient::execute`]. Any non-2xx answer and any
//! transport failure surface uniformly as a [`CoreError`]; there are no
//! retries and no timeout beyond the client defaults.

use crate::error::{CoreError, Result};
use serde_json::Value;
use tracing::debug;

/// Production API base
pub const DEFAULT_API_BASE: &str = "https://api.trello.com/1";

/// Client for the upstream task-board REST API
#[derive(Debug, Clone)]
pub struct TrelloClient {
    http: reqwest::Client,
    base: String,
    key: String,
    token: String,
}

/// Partial card update; only the fields present are sent upstream
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub list_id: Option<String>,
}

impl TrelloClient {
    pub fn new(base: &str, key: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            key: key.to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .query(&[("key", self.key.as_str()), ("token", self.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CoreError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        // Trello answers JSON; tolerate anything else as a plain string.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }

    /// `POST /cards` — create a card on a list
    pub async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: Option<&str>,
    ) -> Result<Value> {
        debug!(list_id, "creating card upstream");
        let mut params = vec![("idList", list_id), ("name", name)];
        if let Some(desc) = desc {
            params.push(("desc", desc));
        }
        self.execute(self.http.post(self.url("/cards")).query(&params))
            .await
    }

    /// `PUT /cards/{id}` — update the provided card fields
    pub async fn update_card(&self, card_id: &str, patch: &CardPatch) -> Result<Value> {
        debug!(card_id, "updating card upstream");
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(name) = &patch.name {
            params.push(("name", name));
        }
        if let Some(desc) = &patch.desc {
            params.push(("desc", desc));
        }
        if let Some(list_id) = &patch.list_id {
            params.push(("idList", list_id));
        }
        self.execute(
            self.http
                .put(self.url(&format!("/cards/{card_id}")))
                .query(&params),
        )
        .await
    }

    /// `PUT /cards/{id}?closed=true` — archive is an update with the
    /// closed flag set
    pub async fn archive_card(&self, card_id: &str) -> Result<Value> {
        debug!(card_id, "archiving card upstream");
        self.execute(
            self.http
                .put(self.url(&format!("/cards/{card_id}")))
                .query(&[("closed", "true")]),
        )
        .await
    }

    /// `POST /boards` — create a board
    pub async fn create_board(&self, name: &str, default_lists: Option<bool>) -> Result<Value> {
        debug!(name, "creating board upstream");
        let mut params = vec![("name", name.to_string())];
        if let Some(default_lists) = default_lists {
            params.push(("defaultLists", default_lists.to_string()));
        }
        self.execute(self.http.post(self.url("/boards")).query(&params))
            .await
    }

    /// `GET /boards/{id}/lists` — lists with their open cards nested
    pub async fn board_lists(&self, board_id: &str) -> Result<Value> {
        debug!(board_id, "fetching board lists upstream");
        self.execute(
            self.http
                .get(self.url(&format!("/boards/{board_id}/lists")))
                .query(&[
                    ("cards", "open"),
                    ("card_fields", "name,desc,idList"),
                    ("fields", "name"),
                ]),
        )
        .await
    }

    /// `POST /webhooks` — register a change-notification callback
    pub async fn register_webhook(
        &self,
        callback_url: &str,
        id_model: &str,
        description: Option<&str>,
    ) -> Result<Value> {
        debug!(id_model, callback_url, "registering webhook upstream");
        let mut params = vec![("callbackURL", callback_url), ("idModel", id_model)];
        if let Some(description) = description {
            params.push(("description", description));
        }
        self.execute(self.http.post(self.url("/webhooks")).query(&params))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = TrelloClient::new("http://localhost:5000/", "k", "t");
        assert_eq!(client.url("/cards"), "http://localhost:5000/cards");
    }

    #[test]
    fn test_empty_patch_has_no_fields() {
        let patch = CardPatch::default();
        assert!(patch.name.is_none() && patch.desc.is_none() && patch.list_id.is_none());
    }
}
