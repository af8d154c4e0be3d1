//! Router-level tests: auth enforcement and session flow over HTTP.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use vestia_storefront::config::{Config, IdentityConfig, PlacesConfig, StoreConfig};
use vestia_storefront::identity::MemoryIdentity;
use vestia_storefront::services::{DenyingPrompt, MemoryKeystore};
use vestia_storefront::state::AppState;
use vestia_storefront::store::{DocumentStore, MemoryStore, collections};
use vestia_storefront::{middleware, routes};

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        store: StoreConfig {
            endpoint: "http://store.invalid".to_string(),
            api_key: SecretString::from("test-key"),
        },
        identity: IdentityConfig {
            endpoint: "http://identity.invalid".to_string(),
            api_key: SecretString::from("test-key"),
        },
        places: PlacesConfig {
            endpoint: "http://places.invalid".to_string(),
            api_key: None,
        },
        sentry_dsn: None,
    }
}

async fn app() -> (Router, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    store
        .set(
            collections::PRODUCT,
            "shirt",
            json!({ "productName": "Linen Shirt", "price": "120000" }),
        )
        .await
        .unwrap();

    let state = AppState::new(
        test_config(),
        store.clone(),
        Arc::new(MemoryIdentity::new()),
        Arc::new(MemoryKeystore::new()),
        Arc::new(DenyingPrompt),
    );
    let session_layer = middleware::create_session_layer(state.config());
    let router = routes::routes().layer(session_layer).with_state(state);
    (router, store)
}

#[tokio::test]
async fn guest_checkout_is_rejected_before_any_write() {
    let (app, store) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout/confirm")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.list(collections::BILL).await.unwrap().is_empty());
    assert!(store.list(collections::ORDER).await.unwrap().is_empty());
}

#[tokio::test]
async fn guest_cart_add_is_rejected_before_any_write() {
    let (app, store) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"productId":"shirt","size":"M","quantity":1}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.list(collections::ORDER).await.unwrap().is_empty());
}

#[tokio::test]
async fn signup_establishes_a_session() {
    let (app, _store) = app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"Ana","email":"ana@example.com","password":"hunter22","confirmPassword":"hunter22"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/session")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user"]["email"], "ana@example.com");
}

#[tokio::test]
async fn guest_session_is_empty() {
    let (app, _store) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["user"].is_null());
}
