//! Catalog product and category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Language, Money};

/// A catalog entry. Products carry Malay and Chinese display names alongside
/// the English one; lookups fall back to English when a localization is
/// missing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_zh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    pub category: String,
    pub image: String,
    pub stock: u32,
    pub source: ProductSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProductSource {
    Local,
    Shopee { item_id: u64 },
}

impl Product {
    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name,
            Language::Ms => self.name_ms.as_deref().unwrap_or(&self.name),
            Language::Zh => self.name_zh.as_deref().unwrap_or(&self.name),
        }
    }

    /// Case-insensitive match against every localization of the name.
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q)
            || self.name_ms.as_deref().is_some_and(|n| n.to_lowercase().contains(&q))
            || self.name_zh.as_deref().is_some_and(|n| n.contains(query))
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn shopee_item_id(&self) -> Option<u64> {
        match self.source {
            ProductSource::Shopee { item_id } => Some(item_id),
            ProductSource::Local => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub name_ms: String,
    pub name_zh: String,
    pub icon: String,
}

impl Category {
    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name,
            Language::Ms => &self.name_ms,
            Language::Zh => &self.name_zh,
        }
    }
}
