//! Shopee Open Platform client: token lifecycle and product fetch.
//!
//! Follows the partner API's flat response envelope: every body carries
//! `error`/`message` fields, non-empty `error` meaning failure. Tokens are
//! persisted through the store so a restart keeps the connection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use thiserror::Error;

use crate::shopee::config::ShopeeConfig;
use crate::store::MemoryStore;

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(15);

/// Refresh ahead of expiry by this much.
const REFRESH_WINDOW: i64 = 3600;

#[derive(Error, Debug)]
pub enum ShopeeError {
    #[error("Not authorized. Please connect your Shopee account first.")]
    NotConnected,
    #[error("Shopee API error: {message}")]
    Api { message: String },
    #[error("Shopee request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("import preview not found or expired")]
    PreviewNotFound,
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopeeTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub shop_id: u64,
}

impl ShopeeTokens {
    pub fn from_grant(access_token: String, refresh_token: String, expire_in_secs: i64, shop_id: u64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expire_in_secs),
            shop_id,
        }
    }

    pub fn needs_refresh(&self) -> bool {
        self.expires_at - Utc::now() < Duration::seconds(REFRESH_WINDOW)
    }
}

/// One item as the partner API reports it, prices in micro-units.
#[derive(Clone, Debug, Deserialize)]
pub struct ShopeeItem {
    pub item_id: u64,
    pub item_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub price_before_discount: Option<i64>,
    #[serde(default)]
    pub category_id: u64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub update_time: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct ItemBatch {
    pub items: Vec<ShopeeItem>,
    pub total_count: u64,
    pub more: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShopInfo {
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expire_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ItemListResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    item_list: Vec<ItemRef>,
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct ItemRef {
    item_id: u64,
}

#[derive(Debug, Deserialize)]
struct ItemDetailResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    item: Option<ShopeeItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    items: Vec<ShopeeItem>,
    #[serde(default)]
    #[allow(dead_code)]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct ShopInfoResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
    shop: Option<ShopInfo>,
}

fn ensure_ok(error: &str, message: &str) -> Result<(), ShopeeError> {
    if error.is_empty() {
        return Ok(());
    }
    let message = if message.is_empty() { error } else { message };
    Err(ShopeeError::Api { message: message.to_string() })
}

pub struct ShopeeClient {
    http: reqwest::Client,
    config: ShopeeConfig,
    store: Arc<MemoryStore>,
}

impl ShopeeClient {
    pub fn new(config: ShopeeConfig, store: Arc<MemoryStore>) -> Self {
        Self { http: reqwest::Client::new(), config, store }
    }

    pub fn config(&self) -> &ShopeeConfig {
        &self.config
    }

    fn timestamp() -> i64 {
        Utc::now().timestamp()
    }

    /// Request signature. Placeholder only, mirroring the storefront's demo
    /// signing; the partner API's real scheme is HMAC-SHA256 over the
    /// partner key.
    // TODO: implement HMAC-SHA256 signing before pointing at production
    fn sign(&self, _base: &str) -> String {
        format!("mock_signature_{}", Utc::now().timestamp_millis())
    }

    async fn post<T: serde::de::DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ShopeeError> {
        let url = format!("{}{}", self.config.api_url, path);
        let signature = self.sign(&format!("{url}|{body}"));
        let resp = self
            .http
            .post(&url)
            .header("Authorization", signature)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;
        Ok(resp.json::<T>().await?)
    }

    /// Seller-facing authorization URL the admin is redirected to.
    pub fn authorization_url(&self) -> Result<String, ShopeeError> {
        let signature = self.sign(&format!("{}{}", self.config.partner_id, self.config.redirect_url));
        let url = reqwest::Url::parse_with_params(
            self.config.auth_page_url(),
            &[
                ("id", self.config.partner_id.to_string()),
                ("token", signature),
                ("redirect", self.config.redirect_url.clone()),
            ],
        )
        .map_err(|e| ShopeeError::Config(format!("bad authorization url: {e}")))?;
        Ok(url.into())
    }

    /// OAuth callback: trades the one-time code for tokens and persists them.
    pub async fn exchange_code(&self, code: &str, shop_id: u64) -> Result<ShopeeTokens, ShopeeError> {
        let body = json!({
            "partner_id": self.config.partner_id,
            "shop_id": shop_id,
            "code": code,
            "timestamp": Self::timestamp(),
        });
        let resp: TokenResponse = self.post("/auth/token/get", &body).await?;
        ensure_ok(&resp.error, &resp.message)?;
        let tokens = Self::tokens_from(resp, shop_id)?;
        self.store.save_shopee_tokens(tokens.clone()).await;
        tracing::info!(shop_id, "shopee shop connected");
        Ok(tokens)
    }

    pub async fn refresh(&self) -> Result<ShopeeTokens, ShopeeError> {
        let current = self.store.shopee_tokens().await.ok_or(ShopeeError::NotConnected)?;
        let body = json!({
            "partner_id": self.config.partner_id,
            "shop_id": current.shop_id,
            "refresh_token": current.refresh_token,
            "timestamp": Self::timestamp(),
        });
        let resp: TokenResponse = self.post("/auth/access_token/get", &body).await?;
        ensure_ok(&resp.error, &resp.message)?;
        let tokens = Self::tokens_from(resp, current.shop_id)?;
        self.store.save_shopee_tokens(tokens.clone()).await;
        tracing::debug!(shop_id = current.shop_id, "shopee token refreshed");
        Ok(tokens)
    }

    fn tokens_from(resp: TokenResponse, shop_id: u64) -> Result<ShopeeTokens, ShopeeError> {
        let access = resp
            .access_token
            .ok_or_else(|| ShopeeError::Api { message: "token response missing access_token".into() })?;
        let refresh = resp
            .refresh_token
            .ok_or_else(|| ShopeeError::Api { message: "token response missing refresh_token".into() })?;
        Ok(ShopeeTokens::from_grant(access, refresh, resp.expire_in.unwrap_or(14400), shop_id))
    }

    /// Current tokens, refreshed when inside the expiry window.
    pub async fn ensure_valid(&self) -> Result<ShopeeTokens, ShopeeError> {
        let tokens = self.store.shopee_tokens().await.ok_or(ShopeeError::NotConnected)?;
        if tokens.needs_refresh() {
            return self.refresh().await;
        }
        Ok(tokens)
    }

    pub async fn disconnect(&self) {
        self.store.clear_shopee_tokens().await;
        tracing::info!("shopee shop disconnected");
    }

    /// One page of the shop's items, detail-fetched one by one the way the
    /// partner API requires.
    pub async fn fetch_items(&self, offset: u32, update_time_from: Option<i64>) -> Result<ItemBatch, ShopeeError> {
        let tokens = self.ensure_valid().await?;
        let mut body = json!({
            "partner_id": self.config.partner_id,
            "shopid": tokens.shop_id,
            "timestamp": Self::timestamp(),
            "pagination_offset": offset,
            "pagination_entries_per_page": self.config.page_size,
        });
        if let Some(from) = update_time_from {
            body["update_time_from"] = json!(from);
        }
        let resp: ItemListResponse = self.post("/product/get_item_list", &body).await?;
        ensure_ok(&resp.error, &resp.message)?;

        let mut items = Vec::with_capacity(resp.item_list.len());
        for item_ref in &resp.item_list {
            items.push(self.item_details(tokens.shop_id, item_ref.item_id).await?);
        }
        Ok(ItemBatch { items, total_count: resp.total_count, more: resp.more })
    }

    async fn item_details(&self, shop_id: u64, item_id: u64) -> Result<ShopeeItem, ShopeeError> {
        let body = json!({
            "partner_id": self.config.partner_id,
            "shopid": shop_id,
            "timestamp": Self::timestamp(),
            "item_id": item_id,
        });
        let resp: ItemDetailResponse = self.post("/product/get_item_base_info", &body).await?;
        ensure_ok(&resp.error, &resp.message)?;
        resp.item.ok_or_else(|| ShopeeError::Api { message: format!("item {item_id} missing from response") })
    }

    /// Keyword search on the public endpoint; no shop authorization needed.
    pub async fn search_items(&self, keyword: &str, offset: u32) -> Result<Vec<ShopeeItem>, ShopeeError> {
        let body = json!({
            "partner_id": self.config.partner_id,
            "timestamp": Self::timestamp(),
            "keyword": keyword,
            "pagination_offset": offset,
            "pagination_entries_per_page": self.config.page_size,
            "sort_type": 1,
        });
        let resp: SearchResponse = self.post("/product/search", &body).await?;
        ensure_ok(&resp.error, &resp.message)?;
        Ok(resp.items)
    }

    pub async fn shop_info(&self) -> Result<ShopInfo, ShopeeError> {
        let tokens = self.ensure_valid().await?;
        let body = json!({
            "partner_id": self.config.partner_id,
            "shopid": tokens.shop_id,
            "timestamp": Self::timestamp(),
        });
        let resp: ShopInfoResponse = self.post("/shop/get_shop_info", &body).await?;
        ensure_ok(&resp.error, &resp.message)?;
        Ok(resp.shop.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_refresh_window() {
        let fresh = ShopeeTokens::from_grant("a".into(), "r".into(), 4 * 3600, 1);
        assert!(!fresh.needs_refresh());
        let stale = ShopeeTokens::from_grant("a".into(), "r".into(), 1800, 1);
        assert!(stale.needs_refresh());
        let expired = ShopeeTokens::from_grant("a".into(), "r".into(), -10, 1);
        assert!(expired.needs_refresh());
    }

    #[test]
    fn test_envelope_error_detection() {
        assert!(ensure_ok("", "").is_ok());
        let err = ensure_ok("error_auth", "Invalid access token").unwrap_err();
        assert_eq!(err.to_string(), "Shopee API error: Invalid access token");
        let err = ensure_ok("error_param", "").unwrap_err();
        assert_eq!(err.to_string(), "Shopee API error: error_param");
    }
}
