//! Account endpoints.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::api::{session_token, ApiError};
use crate::auth::{LoginRequest, RegisterRequest, Session};
use crate::domain::{DomainEvent, UserEvent};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state.auth.register(req).await?;
    state
        .publish(&DomainEvent::User(UserEvent::Registered {
            user_id: session.user_id.to_string(),
            email: session.email.clone(),
        }))
        .await;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.auth.login(req).await?))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = session_token(&headers) {
        state.auth.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.auth.session(session_token(&headers)).await?))
}
