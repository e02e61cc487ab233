//! HTTP contract tests: status codes and the `{"msg": ...}` error body,
//! exercised through the full router with a mocked database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

use stockpilot_api::config::AppConfig;
use stockpilot_api::entities::{product, product_variant};
use stockpilot_api::{app_router, AppState};

const TEST_SECRET: &str = "integration-test-secret-integration-test-secret";

fn state_with(db: MockDatabase) -> AppState {
    let config = AppConfig::new("sqlite::memory:", TEST_SECRET);
    AppState::new(Arc::new(db.into_connection()), config)
}

fn empty_state() -> AppState {
    state_with(MockDatabase::new(DatabaseBackend::Postgres))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = app_router(empty_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["msg"].as_str().unwrap().contains("Authentication"));
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = app_router(empty_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/customers")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_product_answers_404_with_msg_body() {
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()]),
    );
    let token = state.auth.generate_token(1).unwrap();
    let app = app_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/products/9")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["msg"], "Product with id 9 not found");
}

#[tokio::test]
async fn deleting_the_default_variant_answers_400() {
    let default_variant = product_variant::Model {
        id: 4,
        user_id: 1,
        product_id: 2,
        variant_name: "Default".to_string(),
        stock: 5,
        selling_price_modifier: Decimal::ZERO,
        min_stock_alert: 0,
        enable_stock_alerts: false,
        is_default: true,
        attributes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![default_variant]]),
    );
    let token = state.auth.generate_token(1).unwrap();
    let app = app_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/products/2/variants/4")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["msg"], "Cannot delete the default variant");
}

#[tokio::test]
async fn product_detail_is_wrapped_in_its_entity_key() {
    let product = product::Model {
        id: 5,
        user_id: 1,
        name: "Widget".to_string(),
        description: None,
        selling_price: Decimal::new(1999, 2),
        category_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let default_variant = product_variant::Model {
        id: 10,
        user_id: 1,
        product_id: 5,
        variant_name: "Default".to_string(),
        stock: 7,
        selling_price_modifier: Decimal::ZERO,
        min_stock_alert: 2,
        enable_stock_alerts: true,
        is_default: true,
        attributes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let state = state_with(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product]])
            .append_query_results([vec![default_variant]]),
    );
    let token = state.auth.generate_token(1).unwrap();
    let app = app_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/products/5")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["product"]["name"], "Widget");
    assert_eq!(body["product"]["total_stock"], 7);
    assert_eq!(body["product"]["min_stock_alert"], 2);
    assert_eq!(body["product"]["enable_stock_alerts"], true);
}

#[tokio::test]
async fn register_rejects_short_passwords_before_touching_the_db() {
    let app = app_router(empty_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"name":"Ada","email":"ada@example.com","password":"short"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["msg"].as_str().unwrap().contains("Validation failed"));
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = app_router(empty_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}
