//! Freight endpoints: rate card, quoting, shipment tracking and freight
//! orders.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::api::{log_user, session_token, ApiError};
use crate::domain::{DomainEvent, FreightEvent};
use crate::freight::{FreightOrder, FreightQuote, FreightRequest, RateTable, TrackingStatus};
use crate::state::AppState;
use crate::sync::LogLevel;

pub async fn rates(State(state): State<AppState>) -> Json<RateTable> {
    Json(state.freight.rates().clone())
}

pub async fn quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FreightRequest>,
) -> Result<Json<FreightQuote>, ApiError> {
    let user = log_user(&state, &headers).await;
    Ok(Json(state.freight.quote(&req, &user)?))
}

pub async fn track(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(number): Path<String>,
) -> Result<Json<TrackingStatus>, ApiError> {
    let user = log_user(&state, &headers).await;
    Ok(Json(state.freight.track(&number, &user).await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FreightRequest>,
) -> Result<(StatusCode, Json<FreightOrder>), ApiError> {
    let session = state.auth.session(session_token(&headers)).await?;
    let order = state
        .freight
        .create_order(session.user_id.to_string(), session.email.clone(), req)?;

    state.store.save_freight_order(order.clone()).await;
    state.sync.record(
        "createFreightOrder",
        &state.config.tables.freight,
        serde_json::to_value(&order).unwrap_or_default(),
    );
    state.sync.log(
        LogLevel::Info,
        format!("Freight order created: {}", order.id),
        &session.email,
        "freight",
    );
    state
        .publish(&DomainEvent::Freight(FreightEvent::OrderCreated {
            freight_order_id: order.id.clone(),
            cost: order.cost.amount(),
        }))
        .await;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_my_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<FreightOrder>>, ApiError> {
    let session = state.auth.session(session_token(&headers)).await?;
    Ok(Json(state.store.freight_orders_for_user(&session.user_id.to_string()).await))
}
