//! Admin dashboard endpoint: the four headline counters plus recent orders.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::{session_token, ApiError};
use crate::domain::{Order, PaymentStatus};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_users: usize,
    pub total_orders: usize,
    /// Sum of settled order totals, in ringgit.
    pub revenue: Decimal,
    pub recent_orders: Vec<Order>,
}

pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, ApiError> {
    state.auth.admin_session(session_token(&headers)).await?;

    let orders = state.store.list_orders().await;
    let revenue = orders
        .iter()
        .filter(|o| o.payment_status == PaymentStatus::Paid)
        .fold(Decimal::ZERO, |acc, o| acc + o.total.amount());
    let recent_orders = orders.iter().take(5).cloned().collect();

    Ok(Json(DashboardStats {
        total_products: state.store.count_products().await,
        total_users: state.store.count_users().await,
        total_orders: orders.len(),
        revenue,
        recent_orders,
    }))
}
