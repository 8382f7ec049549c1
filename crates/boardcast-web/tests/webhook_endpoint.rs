//! Integration tests for the webhook ingress and SSE endpoint

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use boardcast_core::{Gateway, ProxyConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Gateway whose upstream is never contacted by these tests
fn test_gateway() -> Arc<Gateway> {
    let config = ProxyConfig {
        api_key: "key".into(),
        api_token: "token".into(),
        api_base: "http://127.0.0.1:9".into(),
        ..ProxyConfig::default()
    };
    Arc::new(Gateway::from_config(&config))
}

fn webhook_request(method: Method, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_webhook_probe_answers_ok() {
    for method in [Method::HEAD, Method::GET] {
        let router = boardcast_web::create_router(test_gateway());
        let response = router
            .oneshot(webhook_request(method.clone(), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "method: {method}");
    }
}

#[tokio::test]
async fn test_webhook_delivery_acks_valid_payload() {
    let router = boardcast_web::create_router(test_gateway());
    let body = r#"{"action":{"type":"createCard","data":{"card":{"id":"C1"}}}}"#;

    let response = router
        .oneshot(webhook_request(Method::POST, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_delivery_acks_malformed_payload() {
    // The provider disables callbacks that fail; garbage must still be 200.
    for body in ["this is not json", "", "{}", "[1,2,3]"] {
        let router = boardcast_web::create_router(test_gateway());
        let response = router
            .oneshot(webhook_request(Method::POST, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "body: {body:?}");
    }
}

#[tokio::test]
async fn test_webhook_delivery_broadcasts_raw_and_canonical() {
    let gateway = test_gateway();
    let mut rx = gateway.bus().subscribe();
    let router = boardcast_web::create_router(Arc::clone(&gateway));

    let body = json!({
        "action": {
            "type": "updateCard",
            "data": {
                "old": { "idList": "L1" },
                "listAfter": { "id": "L2" },
                "card": { "id": "C1", "idList": "L2" }
            }
        }
    });
    let response = router
        .oneshot(webhook_request(Method::POST, &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw = rx.recv().await.unwrap();
    assert_eq!(raw.channel(), "webhookEvent");
    assert_eq!(raw.payload(), body);

    let canonical = rx.recv().await.unwrap();
    assert_eq!(canonical.channel(), "trelloEvent");
    assert_eq!(canonical.payload()["eventType"], "moveCard");
    assert_eq!(canonical.payload()["listId"], "L2");
}

#[tokio::test]
async fn test_sse_endpoint_exists() {
    let router = boardcast_web::create_router(test_gateway());

    let request = Request::builder()
        .uri("/api/events")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());

    assert!(content_type.is_some());
    assert!(content_type.unwrap().contains("text/event-stream"));
}

#[tokio::test]
async fn test_health_endpoint_reports_cache_and_subscribers() {
    let gateway = test_gateway();
    gateway.cache().put("B1", json!([{ "id": "L1" }]));
    let router = boardcast_web::create_router(Arc::clone(&gateway));

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cachedBoards"], 1);
}
