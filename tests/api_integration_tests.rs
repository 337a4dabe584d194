//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each maintenance endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use storefront_cache::{api::create_router, AppState, CacheStore, ContentCache, TtlPolicy};
use tempfile::TempDir;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (TempDir, Arc<CacheStore>, Router) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(CacheStore::open(dir.path()).unwrap());
    let state = AppState::new(ContentCache::new(store.clone(), TtlPolicy::default()));
    (dir, store, create_router(state))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == INVALIDATE Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_product_endpoint() {
    let (_dir, store, app) = create_test_app();
    for key in ["product:42", "category:7", "homepage", "product:99"] {
        store.set(key, "v", 600).unwrap();
    }

    let response = app
        .oneshot(post_json(
            "/invalidate",
            r#"{"entityType":"product","entityId":42,"parentCategoryId":7}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 3);
    assert_eq!(json["keys"][0], "product:42");

    assert!(store.get::<String>("product:42").is_none());
    assert!(store.get::<String>("product:99").is_some());
}

#[tokio::test]
async fn test_invalidate_unknown_entity() {
    let (_dir, _store, app) = create_test_app();

    let response = app
        .oneshot(post_json("/invalidate", r#"{"entityType":"coupon","entityId":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("coupon"));
}

#[tokio::test]
async fn test_invalidate_malformed_body() {
    let (_dir, _store, app) = create_test_app();

    let response = app
        .oneshot(post_json("/invalidate", r#"{"entityId":1}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == NAMESPACE Endpoint Tests ==

#[tokio::test]
async fn test_namespace_endpoint() {
    let (_dir, store, app) = create_test_app();
    store.set("search:a", "1", 600).unwrap();
    store.set("search:b", "2", 600).unwrap();
    store.set("product:7", "p", 600).unwrap();

    let response = app
        .oneshot(empty("DELETE", "/namespace/search"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);
    assert_eq!(json["namespaces"][0], "search");
    assert_eq!(store.len(), 1);
}

// == SWEEP / CLEAR Endpoint Tests ==

#[tokio::test]
async fn test_sweep_endpoint() {
    let (dir, store, app) = create_test_app();
    store.set("product:1", "live", 600).unwrap();
    std::fs::create_dir_all(dir.path().join("search")).unwrap();
    std::fs::write(dir.path().join("search").join("corrupt.json"), b"nope").unwrap();

    let response = app.oneshot(empty("POST", "/sweep")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let (_dir, store, app) = create_test_app();
    store.set("product:1", "a", 600).unwrap();
    store.set("homepage", "b", 600).unwrap();

    let response = app.oneshot(empty("DELETE", "/cache")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);
    assert!(store.is_empty());
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (_dir, store, app) = create_test_app();
    store.set("product:1", "a", 600).unwrap();
    let _ = store.get::<String>("product:1");
    let _ = store.get::<String>("product:2");

    let response = app.oneshot(empty("GET", "/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["valid_entries"], 1);
    assert_eq!(json["expired_entries"], 0);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < 0.001);
    assert!(json["total_bytes"].as_u64().unwrap() > 0);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, _store, app) = create_test_app();

    let response = app.oneshot(empty("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (_dir, _store, app) = create_test_app();

    let response = app.oneshot(empty("GET", "/get/product:1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
