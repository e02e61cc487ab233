//! Stockpilot API library.
//!
//! Multi-tenant inventory management behind a JWT-authenticated REST API:
//! products and their stock-tracking variants, a category tree, customer and
//! supplier books, and purchase links between variants and suppliers.
#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod pagination;
pub mod query;
pub mod services;

use axum::extract::FromRef;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::auth::{AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::services::categories::CategoryService;
use crate::services::customers::CustomerService;
use crate::services::products::ProductService;
use crate::services::stats::StatsService;
use crate::services::suppliers::SupplierService;
use crate::services::users::UserService;
use crate::services::variant_suppliers::VariantSupplierService;
use crate::services::variants::VariantService;

/// One instance of every domain service, shared across handlers.
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub variants: VariantService,
    pub categories: CategoryService,
    pub customers: CustomerService,
    pub suppliers: SupplierService,
    pub variant_suppliers: VariantSupplierService,
    pub stats: StatsService,
    pub users: UserService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self {
            products: ProductService::new(db.clone()),
            variants: VariantService::new(db.clone()),
            categories: CategoryService::new(db.clone()),
            customers: CustomerService::new(db.clone()),
            suppliers: SupplierService::new(db.clone()),
            variant_suppliers: VariantSupplierService::new(db.clone()),
            stats: StatsService::new(db.clone()),
            users: UserService::new(db, auth),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        let services = AppServices::new(db.clone(), auth.clone());
        Self {
            db,
            config: Arc::new(config),
            auth,
            services,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Everything under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", handlers::auth::auth_routes())
        .nest(
            "/products",
            handlers::products::product_routes().merge(handlers::variants::product_scoped_routes()),
        )
        .nest(
            "/variant-suppliers",
            handlers::variant_suppliers::variant_supplier_routes(),
        )
        .nest("/categories", handlers::categories::category_routes())
        .nest("/customers", handlers::customers::customer_routes())
        .nest(
            "/suppliers",
            handlers::suppliers::supplier_routes()
                .merge(handlers::variant_suppliers::supplier_scoped_routes()),
        )
        .nest("/stats", handlers::stats::stats_routes())
}

/// CORS policy from configuration. An explicit origin list always wins;
/// without one, development gets a permissive policy and other environments
/// get none at all.
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE];

    match &config.cors_allowed_origins {
        Some(raw) => {
            let origins: Vec<HeaderValue> = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = o, "ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            Some(
                CorsLayer::new()
                    .allow_origin(origins)
                    .allow_methods(methods)
                    .allow_headers(headers),
            )
        }
        None if config.is_development() => Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers(headers),
        ),
        None => None,
    }
}

/// Builds the complete application router with middleware applied.
pub fn app_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    if let Some(cors) = cors_layer(&state.config) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn router_builds_with_mock_state() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let config = AppConfig::new("sqlite::memory:", "test-secret-test-secret-test-secret");
        let state = AppState::new(Arc::new(db), config);
        let _ = app_router(state);
    }
}
