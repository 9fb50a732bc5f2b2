//! Import pipeline: preview fetched Shopee items, then confirm a selection
//! into the local catalog.
//!
//! Previews are held server-side keyed by id so confirmation works on the
//! exact items the admin saw, not on whatever the shop returns a minute
//! later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::TableNames;
use crate::domain::{Money, Product, ProductSource};
use crate::shopee::client::{ItemBatch, ShopeeClient, ShopeeError, ShopeeItem};
use crate::shopee::config::ShopeeConfig;
use crate::store::MemoryStore;
use crate::sync::SyncHandle;

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200?text=No+Image";
const DEFAULT_DESCRIPTION: &str = "No description available";

/// How the preview picks items from the connected shop.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ImportMethod {
    /// Every item in the shop, first page.
    All,
    /// Keyword search on the public catalog.
    Search { keyword: String },
    /// Only items updated since the last sync.
    RecentlyUpdated,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct ImportOptions {
    /// Replace products that were already imported from the same item.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportCandidate {
    pub item_id: u64,
    pub name: String,
    pub price: Money,
    pub category: String,
    pub image: String,
    pub stock: u32,
    pub already_imported: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportPreview {
    pub id: Uuid,
    pub candidates: Vec<ImportCandidate>,
    pub total_count: u64,
    pub more: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: Vec<FailedImport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FailedImport {
    pub item_id: u64,
    pub reason: String,
}

/// One line of the admin-facing sync history.
#[derive(Clone, Debug, Serialize)]
pub struct SyncLogEntry {
    pub action: String,
    pub products: usize,
    pub status: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub sandbox: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

/// Convert a Shopee item into a catalog product. Prices arrive in
/// micro-units and divide down to ringgit.
pub fn normalize(config: &ShopeeConfig, item: &ShopeeItem) -> Product {
    let now = Utc::now();
    Product {
        id: format!("shopee_{}", item.item_id),
        name: item.item_name.clone(),
        name_ms: None,
        name_zh: None,
        description: Some(
            item.description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        ),
        price: Money::myr(micro_to_myr(item.price)),
        original_price: item.price_before_discount.map(|p| Money::myr(micro_to_myr(p))),
        category: config.resolve_category(item.category_id),
        image: item
            .images
            .first()
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        stock: item.stock,
        source: ProductSource::Shopee { item_id: item.item_id },
        created_at: now,
        updated_at: now,
    }
}

fn micro_to_myr(micro: i64) -> Decimal {
    Decimal::new(micro, 5).normalize()
}

pub struct ImportService {
    client: Arc<ShopeeClient>,
    store: Arc<MemoryStore>,
    sync: SyncHandle,
    tables: TableNames,
}

impl ImportService {
    pub fn new(client: Arc<ShopeeClient>, store: Arc<MemoryStore>, sync: SyncHandle, tables: TableNames) -> Self {
        Self { client, store, sync, tables }
    }

    pub async fn connection_status(&self) -> ConnectionStatus {
        let tokens = self.store.shopee_tokens().await;
        ConnectionStatus {
            connected: tokens.is_some(),
            sandbox: self.client.config().sandbox,
            shop_id: tokens.as_ref().map(|t| t.shop_id),
            expires_at: tokens.map(|t| t.expires_at),
            last_sync: self.store.shopee_last_sync().await,
        }
    }

    /// Fetch candidates and park them under a preview id.
    pub async fn preview(&self, method: ImportMethod) -> Result<ImportPreview, ShopeeError> {
        let batch = match &method {
            ImportMethod::All => self.client.fetch_items(0, None).await?,
            ImportMethod::RecentlyUpdated => {
                let from = self.store.shopee_last_sync().await.map(|t| t.timestamp());
                self.client.fetch_items(0, from).await?
            }
            ImportMethod::Search { keyword } => {
                let items = self.client.search_items(keyword, 0).await?;
                ItemBatch { total_count: items.len() as u64, more: false, items }
            }
        };

        let mut drafts = Vec::with_capacity(batch.items.len());
        let mut candidates = Vec::with_capacity(batch.items.len());
        for item in &batch.items {
            let draft = normalize(self.client.config(), item);
            candidates.push(ImportCandidate {
                item_id: item.item_id,
                name: draft.name.clone(),
                price: draft.price.clone(),
                category: draft.category.clone(),
                image: draft.image.clone(),
                stock: draft.stock,
                already_imported: self.store.find_product(&draft.id).await.is_some(),
            });
            drafts.push(draft);
        }

        let preview = ImportPreview {
            id: Uuid::new_v4(),
            candidates,
            total_count: batch.total_count,
            more: batch.more,
            created_at: Utc::now(),
        };
        self.store.put_pending_import(preview.id, drafts).await;
        tracing::info!(preview_id = %preview.id, count = preview.candidates.len(), "shopee import preview ready");
        Ok(preview)
    }

    /// Import the selected items from a preview. Existing products are
    /// skipped unless `overwrite` is set.
    pub async fn confirm(
        &self,
        preview_id: Uuid,
        selected: &[u64],
        options: ImportOptions,
    ) -> Result<ImportReport, ShopeeError> {
        let drafts = self
            .store
            .take_pending_import(preview_id)
            .await
            .ok_or(ShopeeError::PreviewNotFound)?;
        let by_item: HashMap<u64, Product> = drafts
            .into_iter()
            .filter_map(|p| p.shopee_item_id().map(|id| (id, p)))
            .collect();

        let mut report = ImportReport::default();
        for &item_id in selected {
            let Some(draft) = by_item.get(&item_id) else {
                report.failed.push(FailedImport { item_id, reason: "not part of this preview".into() });
                continue;
            };
            if self.store.find_product(&draft.id).await.is_some() && !options.overwrite {
                report.skipped += 1;
                continue;
            }
            self.save_product(draft.clone()).await;
            report.imported += 1;
        }

        self.record_sync("import", &report).await;
        Ok(report)
    }

    /// Re-import every item in the shop, overwriting local copies.
    pub async fn sync_all(&self) -> Result<ImportReport, ShopeeError> {
        let mut report = ImportReport::default();
        let mut offset = 0u32;
        loop {
            let batch = self.client.fetch_items(offset, None).await?;
            let fetched = batch.items.len();
            for item in &batch.items {
                self.save_product(normalize(self.client.config(), item)).await;
                report.imported += 1;
            }
            if !batch.more || fetched == 0 {
                break;
            }
            offset += fetched as u32;
        }

        self.record_sync("sync", &report).await;
        Ok(report)
    }

    pub async fn sync_logs(&self) -> Vec<SyncLogEntry> {
        self.store.shopee_sync_logs().await
    }

    async fn save_product(&self, product: Product) {
        self.sync.record(
            "saveShopeeProduct",
            &self.tables.products,
            serde_json::to_value(&product).unwrap_or(Value::Null),
        );
        self.store.upsert_product(product).await;
    }

    async fn record_sync(&self, action: &str, report: &ImportReport) {
        let now = Utc::now();
        let entry = SyncLogEntry {
            action: action.to_string(),
            products: report.imported,
            status: if report.failed.is_empty() { "success" } else { "failed" }.to_string(),
            details: format!(
                "{} imported, {} skipped, {} failed",
                report.imported,
                report.skipped,
                report.failed.len()
            ),
            timestamp: now,
        };
        self.sync.record(
            "addShopeeSyncLog",
            &self.tables.logs,
            serde_json::to_value(&entry).unwrap_or(Value::Null),
        );
        self.store.append_shopee_sync_log(entry).await;
        self.store.set_shopee_last_sync(now).await;
        tracing::info!(
            action,
            imported = report.imported,
            skipped = report.skipped,
            failed = report.failed.len(),
            "shopee catalog updated"
        );
    }
}
