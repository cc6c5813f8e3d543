//! End-to-end API tests.
//!
//! The full router runs against the in-memory store and cache
//! doubles, exercised through `tower::ServiceExt::oneshot` without a
//! listening socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use partner_api::{create_api_router, AppState};
use partner_storage::{InMemoryCache, InMemoryPartnerStore, PartnerService, ServiceConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let partners = PartnerService::new(
        Arc::new(InMemoryPartnerStore::new()),
        Arc::new(InMemoryCache::new()),
        ServiceConfig::default(),
    );
    create_api_router(AppState::new(partners))
}

fn partner_body(document: &str) -> Value {
    json!({
        "trading_name": "Adega da Cerveja - Pinheiros",
        "owner_name": "Ze da Silva",
        "document": document,
        "coverage_area": {
            "type": "MultiPolygon",
            "coordinates": [[[[30, 20], [45, 40], [10, 40], [30, 20]]]],
        },
        "address": {"type": "Point", "coordinates": [30.0, 30.0]},
    })
}

async fn post_partner(app: &Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/partners/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_returns_200_empty() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_create_partner_assigns_id() {
    let app = test_app();
    let (status, body) = post_partner(&app, &partner_body("12345678901234")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["trading_name"], "Adega da Cerveja - Pinheiros");
    assert_eq!(body["owner_name"], "Ze da Silva");
    assert_eq!(body["document"], "12345678901234");
    assert_eq!(body["coverage_area"]["type"], "MultiPolygon");
    assert_eq!(body["address"]["type"], "Point");
}

#[tokio::test]
async fn test_duplicate_document_is_400() {
    let app = test_app();
    let (status, _) = post_partner(&app, &partner_body("12345678901234")).await;
    assert_eq!(status, StatusCode::OK);

    let mut second = partner_body("12345678901234");
    second["trading_name"] = json!("Another Trading Name");
    second["owner_name"] = json!("Another Owner");

    let (status, body) = post_partner(&app, &second).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Document already exists.");
}

#[tokio::test]
async fn test_invalid_geometry_is_400() {
    let app = test_app();
    let mut body = partner_body("99999999999999");
    // Unclosed ring.
    body["coverage_area"]["coordinates"] =
        json!([[[[30, 20], [45, 40], [10, 40], [30, 21]]]]);

    let (status, response) = post_partner(&app, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_GEOMETRY");
}

#[tokio::test]
async fn test_get_partner_by_id() {
    let app = test_app();
    let (_, created) = post_partner(&app, &partner_body("12345678901234")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = get(&app, &format!("/partners/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_get_unknown_partner_is_404() {
    let app = test_app();
    let (status, body) = get(&app, "/partners/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTNER_NOT_FOUND");
}

#[tokio::test]
async fn test_search_finds_covering_partner() {
    let app = test_app();
    let (_, created) = post_partner(&app, &partner_body("12345678901234")).await;

    let (status, body) = get(&app, "/partners?long=30.0&lat=30.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);
}

#[tokio::test]
async fn test_search_with_no_covering_partner_is_404() {
    let app = test_app();
    post_partner(&app, &partner_body("12345678901234")).await;

    let (status, _) = get(&app, "/partners?long=1.1&lat=1.1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_outside_coordinate_range_is_404() {
    // Coordinates beyond the geohashable range cannot be cached, but
    // the answer is still the store's: no coverage, 404.
    let app = test_app();
    post_partner(&app, &partner_body("12345678901234")).await;

    let (status, body) = get(&app, "/partners?long=200.0&lat=95.0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTNER_NOT_FOUND");
}

#[tokio::test]
async fn test_search_picks_nearest_of_two_covering() {
    let app = test_app();

    let mut far = partner_body("11111111111111");
    far["address"] = json!({"type": "Point", "coordinates": [40.0, 38.0]});
    let mut near = partner_body("22222222222222");
    near["address"] = json!({"type": "Point", "coordinates": [31.0, 31.0]});

    post_partner(&app, &far).await;
    let (_, near_created) = post_partner(&app, &near).await;

    let (status, body) = get(&app, "/partners?long=30.0&lat=30.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], near_created["id"]);
}

#[tokio::test]
async fn test_repeat_read_is_served_identically() {
    // Cache coherency at the HTTP level: the second read returns the
    // same representation as the first.
    let app = test_app();
    let (_, created) = post_partner(&app, &partner_body("12345678901234")).await;
    let uri = format!("/partners/{}", created["id"]);

    let (_, first) = get(&app, &uri).await;
    let (_, second) = get(&app, &uri).await;
    assert_eq!(first, second);
}
