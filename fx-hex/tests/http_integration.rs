//! Integration tests for the HTTP adapter.
//!
//! Requests go through the full router (rate limiting, tracing, handlers)
//! with `tower::ServiceExt::oneshot`, against the in-memory store and the
//! fixed development rate provider.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use fx_hex::{CacheConfig, ConversionService, RateCache, inbound::HttpServer};
use fx_repo::{FixedRateProvider, InMemoryRepo};

/// Helper to create a test server over a seeded in-memory store.
fn create_test_server(requests_per_minute: u32) -> HttpServer<InMemoryRepo> {
    let cache = RateCache::new(Arc::new(FixedRateProvider::new()), CacheConfig::default());
    let service = ConversionService::new(InMemoryRepo::seeded(), cache);
    HttpServer::with_rate_limit(service, requests_per_minute)
}

fn app() -> Router {
    create_test_server(1_000).router()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = app();

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_convert_identity() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/convert",
            json!({ "amount": "12.34", "from": "usd", "to": "USD", "mode": "up" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "12.34");
    assert_eq!(body["source"], "identity");
    assert_eq!(body["from"], "USD");
}

#[tokio::test]
async fn test_override_round_trip() {
    let app = app();

    let (status, _) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/overrides",
            json!({ "from_currency": "USD", "to_currency": "VND", "from_value": 1, "to_value": 25000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/convert",
            json!({ "amount": 2, "from": "USD", "to": "VND" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "50000.00");
    assert_eq!(body["source"], "override");

    let (status, body) = send(&app, empty_request(Method::GET, "/api/overrides")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/overrides/USD/VND")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, empty_request(Method::DELETE, "/api/overrides/USD/VND")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorKind"], "NotFound");
}

#[tokio::test]
async fn test_convert_through_provider() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/convert",
            json!({ "amount": "3", "from": "USD", "to": "VND" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "75000.00");
    assert_eq!(body["source"], "provider");
}

#[tokio::test]
async fn test_convert_errors() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/convert",
            json!({ "amount": "1", "from": "USD", "to": "XYZ" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "UnknownCurrency");
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().unwrap().contains("XYZ"));

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/convert",
            json!({ "amount": "1.005", "from": "USD", "to": "EUR" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errorKind"], "ValidationError");
}

#[tokio::test]
async fn test_convert_result_out_of_range() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/convert",
            json!({ "amount": "999999999999999", "from": "USD", "to": "VND" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errorKind"], "Overflow");
    assert_eq!(body["code"], 422);
}

#[tokio::test]
async fn test_validate_and_format_amounts() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/amounts/validate",
            json!({ "value": "$1,234.567" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["normalized"], "1234.56");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/amounts/validate", json!({ "value": "-5" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errorKind"], "ValidationError");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/amounts/format",
            json!({ "amount": 1500000, "style": "compact", "currency_code": "VND" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"], "1.5M VND");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/amounts/format",
            json!({ "amount": "1234.5", "options": { "locale": "en-US", "currency_symbol": "$" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"], "$1,234.50");
}

#[tokio::test]
async fn test_format_caps_fraction_digits() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/amounts/format",
            json!({
                "amount": "1",
                "options": { "min_fraction_digits": 4000000000u32, "max_fraction_digits": 4000000000u32 }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["formatted"].as_str().unwrap().len(), 30);
}

#[tokio::test]
async fn test_rate_table_lifecycle() {
    let app = app();

    let (status, body) = send(&app, empty_request(Method::GET, "/api/rates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, body) = send(&app, empty_request(Method::GET, "/api/rates/usd")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "USD");
    assert_eq!(body["stale"], false);
    assert_eq!(body["rates"]["VND"], "25000");

    let (_, body) = send(&app, empty_request(Method::GET, "/api/rates")).await;
    assert_eq!(body[0]["base"], "USD");
    assert_eq!(body[0]["state"], "fresh");

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/rates/USD")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/rates/USD")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_currencies() {
    let app = app();

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/currencies",
            json!({ "code": "thb", "name": "Thai Baht" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, empty_request(Method::GET, "/api/currencies")).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(codes.contains(&"USD"));
    assert!(codes.contains(&"THB"));
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let app = create_test_server(2).router();

    let request = |client: &str| {
        Request::builder()
            .uri("/api/currencies")
            .header("X-Client-Id", client)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(&app, request("a")).await.0, StatusCode::OK);
    assert_eq!(send(&app, request("a")).await.0, StatusCode::OK);

    let (status, body) = send(&app, request("a")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["errorKind"], "RateLimited");

    assert_eq!(send(&app, request("b")).await.0, StatusCode::OK);

    for _ in 0..5 {
        let (status, _) = send(&app, empty_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app();

    let (status, body) = send(&app, empty_request(Method::GET, "/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/convert"].is_object());
}
