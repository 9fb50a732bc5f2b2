//! Shopee marketplace integration: partner API client, OAuth-style shop
//! connection and the product import pipeline.

pub mod client;
pub mod config;
pub mod import;

pub use client::{ItemBatch, ShopInfo, ShopeeClient, ShopeeError, ShopeeItem, ShopeeTokens};
pub use config::ShopeeConfig;
pub use import::{
    ConnectionStatus, FailedImport, ImportCandidate, ImportMethod, ImportOptions, ImportPreview,
    ImportReport, ImportService, SyncLogEntry,
};
