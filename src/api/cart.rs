//! Cart and checkout endpoints.
//!
//! Carts are keyed by a client-chosen session id and need no login; checkout
//! does. Checkout reprices every line from the live catalog, books a pending
//! order and hands it to the simulated Toyib Pay settlement, which marks the
//! order paid and empties the cart after the configured delay.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::{log_user, session_token, ApiError};
use crate::domain::{Cart, CartItem, CartSummary, LineItem, Money, Order, OrderError};
use crate::state::AppState;
use crate::sync::LogLevel;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Cart session to check out.
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub payment: PaymentIntent,
}

/// What would be handed to the Toyib Pay gateway. The demo never leaves the
/// sandbox; settlement is simulated in-process.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub gateway: &'static str,
    pub merchant_id: String,
    pub environment: &'static str,
    pub order_id: String,
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub customer_email: String,
    pub customer_name: String,
    pub status: String,
}

pub async fn get_cart(State(state): State<AppState>, Path(session): Path<String>) -> Json<Cart> {
    Json(state.store.cart(&session).await)
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(session): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Cart>), ApiError> {
    let product = state
        .store
        .find_product(&req.product_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    if !product.in_stock() {
        return Err(ApiError::Conflict("Out of stock".into()));
    }

    let mut cart = state.store.cart(&session).await;
    cart.add_item(CartItem {
        product_id: product.id.clone(),
        name: product.name.clone(),
        unit_price: product.price.clone(),
        quantity: req.quantity.unwrap_or(1).max(1),
    });
    state.store.save_cart(cart.clone()).await;
    state.sync.log(
        LogLevel::Info,
        format!("Product {} added to cart", product.id),
        log_user(&state, &headers).await,
        "cart",
    );
    Ok((StatusCode::CREATED, Json(cart)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    let mut cart = state.store.cart(&session).await;
    let before = cart
        .items
        .iter()
        .find(|i| i.product_id == product_id)
        .map(|i| i.quantity as i64)
        .unwrap_or(0);
    cart.update_quantity(&product_id, req.quantity)?;
    state.store.save_cart(cart.clone()).await;
    state.sync.log(
        LogLevel::Info,
        format!(
            "Cart updated: Product {}, quantity change: {}",
            product_id,
            req.quantity as i64 - before
        ),
        log_user(&state, &headers).await,
        "cart",
    );
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
) -> Result<Json<Cart>, ApiError> {
    let mut cart = state.store.cart(&session).await;
    cart.remove_item(&product_id)?;
    state.store.save_cart(cart.clone()).await;
    Ok(Json(cart))
}

pub async fn clear_cart(State(state): State<AppState>, Path(session): Path<String>) -> StatusCode {
    state.store.clear_cart(&session).await;
    StatusCode::NO_CONTENT
}

pub async fn summary(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Json<CartSummary> {
    Json(state.store.cart(&session).await.summary())
}

pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let session = state.auth.session(session_token(&headers)).await?;

    let stored = state.store.cart(&req.session_id).await;
    if stored.is_empty() {
        return Err(OrderError::NoItems.into());
    }

    // Reprice every line from the catalog; the cart may hold stale prices.
    let mut repriced = Cart::new(req.session_id.clone());
    for item in &stored.items {
        let product = state.store.find_product(&item.product_id).await.ok_or_else(|| {
            ApiError::NotFound(format!("Product {} is no longer available", item.product_id))
        })?;
        repriced.add_item(CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price.clone(),
            quantity: item.quantity,
        });
    }
    let totals = repriced.summary();

    let order_number = format!("ORD-{:08}", rand::random::<u32>());
    let mut order = Order::create(&order_number, session.user_id.to_string(), session.email.clone());
    for item in &repriced.items {
        order.add_item(LineItem {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            total: item.line_total(),
        });
    }
    order.set_charges(totals.shipping, totals.tax);
    order.place()?;
    let events = order.take_events();

    state.store.save_order(order.clone()).await;
    state.sync.record(
        "createOrder",
        &state.config.tables.orders,
        serde_json::to_value(&order).unwrap_or_default(),
    );
    state.publish_all(events).await;
    tracing::info!(order = %order.order_number, total = %order.total, "checkout started");

    let payment = PaymentIntent {
        gateway: "toyibpay",
        merchant_id: state.config.payment.merchant_id.clone(),
        environment: state.config.payment.environment.as_str(),
        order_id: order.order_number.clone(),
        amount: order.total.clone(),
        currency: "MYR".into(),
        description: "Global Marketplace Order".into(),
        customer_email: session.email.clone(),
        customer_name: session.name.clone(),
        status: "processing".into(),
    };

    spawn_settlement(state, order.id.clone(), req.session_id, session.email);
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order, payment })))
}

/// Simulated gateway settlement: after the configured delay the order flips
/// to paid and the cart is emptied.
fn spawn_settlement(state: AppState, order_id: String, cart_session: String, email: String) {
    let delay = Duration::from_millis(state.config.payment.settle_delay_ms);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let Some(mut order) = state.store.find_order(&order_id).await else { return };
        order.mark_paid();
        let events = order.take_events();
        let order_number = order.order_number.clone();
        let total = order.total.amount();
        state.store.save_order(order).await;
        state.store.clear_cart(&cart_session).await;
        state.sync.log(
            LogLevel::Info,
            format!("Order placed: {order_number}, Amount: RM{total}"),
            &email,
            "cart",
        );
        tracing::info!(order = %order_number, "payment settled");
        state.publish_all(events).await;
    });
}

pub async fn list_my_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
    let session = state.auth.session(session_token(&headers)).await?;
    Ok(Json(state.store.orders_for_user(&session.user_id.to_string()).await))
}

pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let session = state.auth.session(session_token(&headers)).await?;
    let order = state
        .store
        .find_order(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;
    if order.user_id != session.user_id.to_string() && !session.is_admin() {
        return Err(ApiError::NotFound("Order not found".into()));
    }
    Ok(Json(order))
}
