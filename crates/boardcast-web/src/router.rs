//! Web router using Axum
//!
//! Thin plumbing: request decoding, conditional-read headers, and the
//! provider-facing webhook contract (always 200). All proxy semantics live
//! in `boardcast_core::Gateway`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use boardcast_core::{CacheOutcome, CoreError, Gateway};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::sse;

/// Create the web router
pub fn create_router(gateway: Arc<Gateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/tasks", post(create_task_handler))
        .route(
            "/api/tasks/{card_id}",
            put(update_task_handler).delete(archive_task_handler),
        )
        .route("/api/boards", post(create_board_handler))
        .route("/api/boards/{board_id}/lists", get(board_lists_handler))
        .route("/api/webhooks", post(register_webhook_handler))
        // get() also answers the HEAD registration probe.
        .route(
            "/webhook",
            get(webhook_probe_handler).post(webhook_delivery_handler),
        )
        .route("/api/events", get(sse_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(gateway)
}

/// Core errors mapped onto HTTP for API callers
struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Both upstream failure modes are the proxy's "bad gateway".
        let status = match &self.0 {
            CoreError::UpstreamStatus { .. } | CoreError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskBody {
    list_id: String,
    name: String,
    #[serde(default)]
    desc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    id_list: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBoardBody {
    name: String,
    #[serde(default)]
    default_lists: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RegisterWebhookBody {
    #[serde(rename = "callbackURL")]
    callback_url: String,
    #[serde(rename = "idModel")]
    id_model: String,
    #[serde(default)]
    description: Option<String>,
}

async fn create_task_handler(
    State(gateway): State<Arc<Gateway>>,
    Json(body): Json<CreateTaskBody>,
) -> Result<Json<Value>, ApiError> {
    let created = gateway
        .create_card(&body.list_id, &body.name, body.desc.as_deref())
        .await?;
    Ok(Json(created))
}

async fn update_task_handler(
    State(gateway): State<Arc<Gateway>>,
    Path(card_id): Path<String>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Value>, ApiError> {
    let patch = boardcast_core::CardPatch {
        name: body.name,
        desc: body.desc,
        list_id: body.id_list,
    };
    let updated = gateway.update_card(&card_id, &patch).await?;
    Ok(Json(updated))
}

async fn archive_task_handler(
    State(gateway): State<Arc<Gateway>>,
    Path(card_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let archived = gateway.archive_card(&card_id).await?;
    Ok(Json(archived))
}

async fn create_board_handler(
    State(gateway): State<Arc<Gateway>>,
    Json(body): Json<CreateBoardBody>,
) -> Result<Json<Value>, ApiError> {
    let created = gateway.create_board(&body.name, body.default_lists).await?;
    Ok(Json(created))
}

async fn register_webhook_handler(
    State(gateway): State<Arc<Gateway>>,
    Json(body): Json<RegisterWebhookBody>,
) -> Result<Json<Value>, ApiError> {
    let registered = gateway
        .register_webhook(&body.callback_url, &body.id_model, body.description.as_deref())
        .await?;
    Ok(Json(registered))
}

/// Cached list read with conditional-revalidation headers.
///
/// The snapshot fingerprint travels as `ETag` and the fetch time as
/// `Last-Modified`; a matching `If-None-Match`, or an `If-Modified-Since`
/// at least as new as the snapshot, short-circuits with 304.
async fn board_lists_handler(
    State(gateway): State<Arc<Gateway>>,
    Path(board_id): Path<String>,
    request_headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (snapshot, outcome) = gateway.board_lists(&board_id).await?;

    let held_fingerprint = request_headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_matches('"').to_string());
    let known_fresh_at = request_headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_http_date);

    let mut headers = HeaderMap::new();
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", snapshot.fingerprint)) {
        headers.insert(header::ETAG, etag);
    }
    if let Ok(modified) = HeaderValue::from_str(&format_http_date(snapshot.fetched_at)) {
        headers.insert(header::LAST_MODIFIED, modified);
    }
    headers.insert(
        "x-cache",
        HeaderValue::from_static(match outcome {
            CacheOutcome::Hit => "HIT",
            CacheOutcome::Miss => "MISS",
        }),
    );

    if snapshot.is_unchanged_for(held_fingerprint.as_deref(), known_fresh_at) {
        return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
    }

    Ok((headers, Json((*snapshot.payload).clone())).into_response())
}

/// Registration probe from the provider: 200, no body processing
async fn webhook_probe_handler() -> &'static str {
    "OK"
}

/// Webhook delivery. Always acks 200 whatever the body holds; the provider
/// disables callbacks that fail, so processing problems stay on our side.
async fn webhook_delivery_handler(
    State(gateway): State<Arc<Gateway>>,
    body: Bytes,
) -> &'static str {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => {
            gateway.ingest_webhook(payload);
        }
        Err(err) => warn!(error = %err, "ignoring undecodable webhook body"),
    }
    "OK"
}

/// SSE endpoint for live updates
async fn sse_handler(
    State(gateway): State<Arc<Gateway>>,
) -> axum::response::Sse<
    impl futures::stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>,
> {
    sse::create_sse_stream(gateway.bus().clone())
}

async fn health_handler(State(gateway): State<Arc<Gateway>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cachedBoards": gateway.cache().len(),
        "subscribers": gateway.bus().subscriber_count(),
    }))
}

fn format_http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_date_round_trip() {
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 12, 30, 45).unwrap();
        let formatted = format_http_date(at);
        assert_eq!(formatted, "Sat, 01 Aug 2026 12:30:45 GMT");
        assert_eq!(parse_http_date(&formatted), Some(at));
    }

    #[test]
    fn test_parse_http_date_rejects_garbage() {
        assert_eq!(parse_http_date("yesterday"), None);
    }
}
