//! Global Marketplace service binary.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use global_marketplace::api;
use global_marketplace::auth::AuthService;
use global_marketplace::config::AppConfig;
use global_marketplace::freight::{FreightService, SimulatedCarrier};
use global_marketplace::shopee::{ImportService, ShopeeClient};
use global_marketplace::state::AppState;
use global_marketplace::store::MemoryStore;
use global_marketplace::sync::{self, SheetClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env()?);

    let store = Arc::new(MemoryStore::new());
    store.seed_defaults().await;

    let sync = sync::spawn(SheetClient::new(
        config.gas_url.clone(),
        config.app_name.clone(),
        config.version.clone(),
    ));
    if config.gas_url.is_some() {
        tracing::info!(spreadsheet = %config.spreadsheet_name, "sheet sync enabled");
    }

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(url = %url, "connected to NATS");
                Some(client)
            }
            Err(e) => {
                tracing::warn!("NATS connection failed, events disabled: {e}");
                None
            }
        },
        None => None,
    };

    let freight = Arc::new(FreightService::new(
        Arc::new(config.rate_table.clone()),
        Arc::new(SimulatedCarrier),
        sync.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        store.clone(),
        sync.clone(),
        config.tables.clone(),
        config.admin_email.clone(),
    ));
    let shopee = Arc::new(ShopeeClient::new(config.shopee.clone(), store.clone()));
    let imports = Arc::new(ImportService::new(
        shopee.clone(),
        store.clone(),
        sync.clone(),
        config.tables.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        store,
        auth,
        freight,
        shopee,
        imports,
        sync,
        nats,
    };
    let app = api::router(state);

    let port = config.port;
    tracing::info!("🚀 Global Marketplace listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
