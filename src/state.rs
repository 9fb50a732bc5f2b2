//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::domain::DomainEvent;
use crate::freight::FreightService;
use crate::shopee::{ImportService, ShopeeClient};
use crate::store::MemoryStore;
use crate::sync::SyncHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<AuthService>,
    pub freight: Arc<FreightService>,
    pub shopee: Arc<ShopeeClient>,
    pub imports: Arc<ImportService>,
    pub sync: SyncHandle,
    pub nats: Option<async_nats::Client>,
}

impl AppState {
    /// Best-effort domain event publish. Without a broker configured this is
    /// a no-op; with one, failures are logged and dropped.
    pub async fn publish(&self, event: &DomainEvent) {
        let Some(nats) = &self.nats else { return };
        match serde_json::to_vec(event) {
            Ok(payload) => {
                if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
                    tracing::debug!("event publish failed: {e}");
                }
            }
            Err(e) => tracing::debug!("event serialization failed: {e}"),
        }
    }

    pub async fn publish_all(&self, events: Vec<DomainEvent>) {
        for event in &events {
            self.publish(event).await;
        }
    }
}
