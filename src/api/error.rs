//! API error type: every failure a handler can surface, mapped to a status
//! code and a `{"error": ...}` JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::{CartError, OrderError};
use crate::freight::FreightError;
use crate::shopee::ShopeeError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<FreightError> for ApiError {
    fn from(e: FreightError) -> Self {
        match &e {
            FreightError::InvalidInput(_) => Self::BadRequest(e.to_string()),
            FreightError::UnknownZone(_) => Self::Unprocessable(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match &e {
            AuthError::EmailTaken => Self::Conflict(e.to_string()),
            AuthError::InvalidCredentials | AuthError::SessionRequired => {
                Self::Unauthorized(e.to_string())
            }
            AuthError::AdminOnly => Self::Forbidden(e.to_string()),
            AuthError::Validation(_) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<ShopeeError> for ApiError {
    fn from(e: ShopeeError) -> Self {
        match &e {
            ShopeeError::NotConnected => Self::Conflict(e.to_string()),
            ShopeeError::PreviewNotFound => Self::NotFound(e.to_string()),
            ShopeeError::Api { .. } | ShopeeError::Http(_) => Self::Upstream(e.to_string()),
            ShopeeError::Config(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => Self::NotFound("Item not found in cart".into()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NoItems => Self::BadRequest("Your cart is empty".into()),
            OrderError::CannotCancel => Self::Conflict("Order can no longer be cancelled".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let e: ApiError = FreightError::UnknownZone("mars".into()).into();
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let e: ApiError = FreightError::InvalidInput("weight".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        let e: ApiError = AuthError::AdminOnly.into();
        assert_eq!(e.status(), StatusCode::FORBIDDEN);
        let e: ApiError = ShopeeError::NotConnected.into();
        assert_eq!(e.status(), StatusCode::CONFLICT);
    }
}
