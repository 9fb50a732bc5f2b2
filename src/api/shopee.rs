//! Shopee integration endpoints. Everything here is admin-only except the
//! OAuth callback, which arrives as a browser redirect carrying the one-time
//! authorization code.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::{session_token, ApiError};
use crate::domain::{CatalogEvent, DomainEvent};
use crate::shopee::{
    ConnectionStatus, ImportMethod, ImportOptions, ImportPreview, ImportReport, ShopInfo,
    SyncLogEntry,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub shop_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub preview_id: Uuid,
    pub items: Vec<u64>,
    #[serde(default)]
    pub options: ImportOptions,
}

pub async fn connect_url(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    let url = state.shopee.authorization_url()?;
    Ok(Json(json!({ "url": url, "sandbox": state.shopee.config().sandbox })))
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tokens = state.shopee.exchange_code(&params.code, params.shop_id).await?;
    Ok(Json(json!({
        "connected": true,
        "shop_id": tokens.shop_id,
        "expires_at": tokens.expires_at,
    })))
}

pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConnectionStatus>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    Ok(Json(state.imports.connection_status().await))
}

pub async fn shop(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ShopInfo>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    Ok(Json(state.shopee.shop_info().await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConnectionStatus>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    state.shopee.refresh().await?;
    Ok(Json(state.imports.connection_status().await))
}

pub async fn disconnect(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    state.shopee.disconnect().await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn import_preview(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(method): Json<ImportMethod>,
) -> Result<Json<ImportPreview>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    Ok(Json(state.imports.preview(method).await?))
}

pub async fn import_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ImportReport>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    let report = state.imports.confirm(req.preview_id, &req.items, req.options).await?;
    publish_imported(&state, &report).await;
    Ok(Json(report))
}

pub async fn sync_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ImportReport>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    let report = state.imports.sync_all().await?;
    publish_imported(&state, &report).await;
    Ok(Json(report))
}

pub async fn sync_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<SyncLogEntry>>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;
    Ok(Json(state.imports.sync_logs().await))
}

async fn publish_imported(state: &AppState, report: &ImportReport) {
    if report.imported > 0 {
        state
            .publish(&DomainEvent::Catalog(CatalogEvent::ProductsImported {
                source: "shopee".into(),
                count: report.imported,
            }))
            .await;
    }
}
