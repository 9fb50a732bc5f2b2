//! Shopee Open Platform settings and the category mapping.

use anyhow::{Context, Result};
use std::collections::HashMap;

pub const PRODUCTION_API_URL: &str = "https://partner.shopeemobile.com/api/v2";
pub const SANDBOX_API_URL: &str = "https://partner.test-stable.shopeemobile.com/api/v2";
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone, Debug)]
pub struct ShopeeConfig {
    pub partner_id: u64,
    pub partner_key: String,
    pub redirect_url: String,
    pub sandbox: bool,
    /// Resolved API base. Normally derived from `sandbox`; tests point it at
    /// a local mock server.
    pub api_url: String,
    pub page_size: u32,
    /// Shopee category id to local catalog category.
    pub category_map: HashMap<u64, String>,
}

impl ShopeeConfig {
    pub fn from_env() -> Result<Self> {
        let sandbox = std::env::var("SHOPEE_SANDBOX").map(|v| v != "false").unwrap_or(true);
        let api_url = std::env::var("SHOPEE_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| {
                if sandbox { SANDBOX_API_URL.to_string() } else { PRODUCTION_API_URL.to_string() }
            });
        let partner_id = std::env::var("SHOPEE_PARTNER_ID")
            .unwrap_or_else(|_| "0".into())
            .parse::<u64>()
            .context("SHOPEE_PARTNER_ID must be numeric")?;
        let page_size = std::env::var("SHOPEE_PAGE_SIZE")
            .unwrap_or_else(|_| "50".into())
            .parse::<u32>()
            .context("SHOPEE_PAGE_SIZE must be numeric")?
            .min(MAX_PAGE_SIZE);
        Ok(Self {
            partner_id,
            partner_key: std::env::var("SHOPEE_PARTNER_KEY").unwrap_or_default(),
            redirect_url: std::env::var("SHOPEE_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:8080/shopee/callback".into()),
            sandbox,
            api_url,
            page_size,
            category_map: default_category_map(),
        })
    }

    /// For tests: a sandbox config aimed at an arbitrary base URL.
    pub fn for_base_url(api_url: impl Into<String>) -> Self {
        Self {
            partner_id: 123456,
            partner_key: "test-partner-key".into(),
            redirect_url: "http://localhost:8080/shopee/callback".into(),
            sandbox: true,
            api_url: api_url.into(),
            page_size: 50,
            category_map: default_category_map(),
        }
    }

    /// Unknown category ids land in `uncategorized` rather than erroring.
    pub fn resolve_category(&self, category_id: u64) -> String {
        self.category_map
            .get(&category_id)
            .cloned()
            .unwrap_or_else(|| "uncategorized".to_string())
    }

    /// Seller-facing authorization page, distinct from the API base.
    pub fn auth_page_url(&self) -> &'static str {
        if self.sandbox {
            "https://partner.test-stable.shopeemobile.com/api/v2/shop/auth_partner"
        } else {
            "https://partner.shopeemobile.com/api/v2/shop/auth_partner"
        }
    }
}

/// The stock mapping shipped with the storefront.
pub fn default_category_map() -> HashMap<u64, String> {
    let entries: [(u64, &str); 27] = [
        // Electronics
        (100001, "electronics"), // Mobile & Gadgets
        (100002, "electronics"), // Computers & Laptops
        (100003, "electronics"), // Cameras
        (100004, "electronics"), // Audio
        // Fashion
        (200001, "fashion"), // Men's Fashion
        (200002, "fashion"), // Women's Fashion
        (200003, "fashion"), // Kids' Fashion
        (200004, "fashion"), // Accessories
        // Home & Living
        (300001, "home"), // Furniture
        (300002, "home"), // Home Appliances
        (300003, "home"), // Kitchen & Dining
        (300004, "home"), // Bedding & Bath
        // Sports & Outdoors
        (400001, "sports"), // Sports Equipment
        (400002, "sports"), // Fitness
        (400003, "sports"), // Outdoor Gear
        // Books & Stationery
        (500001, "books"), // Books
        (500002, "books"), // Stationery
        (500003, "books"), // Magazines
        // Beauty & Health
        (600001, "beauty"), // Skincare
        (600002, "beauty"), // Makeup
        (600003, "beauty"), // Health & Wellness
        // Toys & Hobbies
        (700001, "toys"), // Toys
        (700002, "toys"), // Hobbies
        (700003, "toys"), // Collectibles
        // Automotive
        (800001, "automotive"), // Car Accessories
        (800002, "automotive"), // Motorcycle Parts
        (800003, "automotive"), // Tools
    ];
    entries.into_iter().map(|(id, cat)| (id, cat.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping_with_fallback() {
        let cfg = ShopeeConfig::for_base_url(SANDBOX_API_URL);
        assert_eq!(cfg.resolve_category(100001), "electronics");
        assert_eq!(cfg.resolve_category(700003), "toys");
        assert_eq!(cfg.resolve_category(999999), "uncategorized");
    }
}
