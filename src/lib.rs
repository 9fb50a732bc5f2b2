//! Global Marketplace
//!
//! Demo marketplace service: multilingual catalog, cart and simulated
//! Toyib Pay checkout, freight quoting with volumetric weight, simulated
//! shipment tracking, Shopee catalog import and a best-effort Google
//! Sheets audit mirror.
//!
//! ## Features
//! - Product catalog with English, Malay and Chinese display names
//! - Cart, checkout and order lifecycle
//! - Freight quoting for local and international shipments
//! - Shopee shop connection and product import
//! - Spreadsheet sync for orders, users and system logs

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod freight;
pub mod shopee;
pub mod state;
pub mod store;
pub mod sync;

pub use config::AppConfig;
pub use state::AppState;
