//! HTTP surface: routing, shared request/response shapes and the session
//! header convention.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod freight;
pub mod shopee;

pub use error::ApiError;

use axum::http::HeaderMap;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Header the storefront sends its session token in after login.
pub const SESSION_HEADER: &str = "x-session-token";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/:id", get(catalog::get_product))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/cart/:session", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/v1/cart/:session/items", post(cart::add_item))
        .route(
            "/api/v1/cart/:session/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/v1/cart/:session/summary", get(cart::summary))
        .route("/api/v1/checkout", post(cart::checkout))
        .route("/api/v1/orders", get(cart::list_my_orders))
        .route("/api/v1/orders/:id", get(cart::get_order))
        .route("/api/v1/freight/rates", get(freight::rates))
        .route("/api/v1/freight/quote", post(freight::quote))
        .route("/api/v1/freight/track/:number", get(freight::track))
        .route(
            "/api/v1/freight/orders",
            get(freight::list_my_orders).post(freight::create_order),
        )
        .route("/api/v1/shopee/connect", get(shopee::connect_url))
        .route("/api/v1/shopee/callback", get(shopee::callback))
        .route("/api/v1/shopee/status", get(shopee::status))
        .route("/api/v1/shopee/shop", get(shopee::shop))
        .route("/api/v1/shopee/refresh", post(shopee::refresh))
        .route("/api/v1/shopee/connection", delete(shopee::disconnect))
        .route("/api/v1/shopee/import/preview", post(shopee::import_preview))
        .route("/api/v1/shopee/import/confirm", post(shopee::import_confirm))
        .route("/api/v1/shopee/sync", post(shopee::sync_all))
        .route("/api/v1/shopee/sync-logs", get(shopee::sync_logs))
        .route("/api/v1/admin/stats", get(admin::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "global-marketplace" }))
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Who to attribute an audit log line to: the logged-in email, else
/// `anonymous` like the storefront does.
pub(crate) async fn log_user(state: &AppState, headers: &HeaderMap) -> String {
    match state.auth.session(session_token(headers)).await {
        Ok(s) => s.email,
        Err(_) => "anonymous".to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
}
