//! Accounts and bearer-token sessions.
//!
//! Credentials are held as entered; this is a demo storefront and the
//! account store never leaves process memory. Serialization skips the
//! password so API payloads and sheet rows never carry it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::config::TableNames;
use crate::store::MemoryStore;
use crate::sync::{LogLevel, SyncHandle};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Please login to continue")]
    SessionRequired,
    #[error("Access denied. Admin only.")]
    AdminOnly,
    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub role: Role,
    pub registered_at: DateTime<Utc>,
}

/// What a session token resolves to. Carried by authenticated handlers.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    store: Arc<MemoryStore>,
    sync: SyncHandle,
    tables: TableNames,
    /// Registering with this email yields an admin account. There is no
    /// role-editing endpoint, so the operator's address is set up front.
    admin_email: Option<String>,
}

impl AuthService {
    pub fn new(
        store: Arc<MemoryStore>,
        sync: SyncHandle,
        tables: TableNames,
        admin_email: Option<String>,
    ) -> Self {
        Self { store, sync, tables, admin_email }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Session, AuthError> {
        req.validate()?;
        if self.store.find_user_by_email(&req.email).await.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let role = match &self.admin_email {
            Some(admin) if admin.eq_ignore_ascii_case(&req.email) => Role::Admin,
            _ => Role::Member,
        };
        let user = User {
            id: Uuid::now_v7(),
            name: req.name,
            email: req.email,
            phone: req.phone.filter(|p| !p.trim().is_empty()),
            password: req.password,
            role,
            registered_at: Utc::now(),
        };
        self.store.insert_user(user.clone()).await;
        self.sync.record(
            "createUser",
            &self.tables.users,
            serde_json::to_value(&user).unwrap_or_default(),
        );
        self.sync.log(
            LogLevel::Info,
            format!("New user registered: {}", user.email),
            &user.email,
            "register",
        );
        tracing::info!(user_id = %user.id, email = %user.email, "user registered");

        Ok(self.open_session(&user).await)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<Session, AuthError> {
        let user = self.store.find_user_by_email(&req.email).await;
        match user {
            Some(user) if user.password == req.password => {
                self.sync.log(
                    LogLevel::Info,
                    format!("User logged in: {}", user.email),
                    &user.email,
                    "login",
                );
                tracing::info!(email = %user.email, "login");
                Ok(self.open_session(&user).await)
            }
            _ => {
                self.sync.log(
                    LogLevel::Warning,
                    format!("Failed login attempt: {}", req.email),
                    &req.email,
                    "login",
                );
                tracing::warn!(email = %req.email, "failed login attempt");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub async fn logout(&self, token: &str) {
        if self.store.remove_session(token).await {
            tracing::info!("session closed");
        }
    }

    pub async fn session(&self, token: Option<&str>) -> Result<Session, AuthError> {
        let token = token.ok_or(AuthError::SessionRequired)?;
        self.store.find_session(token).await.ok_or(AuthError::SessionRequired)
    }

    pub async fn admin_session(&self, token: Option<&str>) -> Result<Session, AuthError> {
        let session = self.session(token).await?;
        if !session.is_admin() {
            return Err(AuthError::AdminOnly);
        }
        Ok(session)
    }

    async fn open_session(&self, user: &User) -> Session {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        self.store.insert_session(session.clone()).await;
        session
    }
}
