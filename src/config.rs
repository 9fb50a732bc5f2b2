//! Service configuration, loaded from the environment once at startup.

use anyhow::{Context, Result};

use crate::freight::RateTable;
use crate::shopee::ShopeeConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub app_name: String,
    pub version: String,
    pub port: u16,
    /// Google Apps Script web-app URL for the spreadsheet mirror. Unset
    /// disables sheet sync entirely.
    pub gas_url: Option<String>,
    pub spreadsheet_name: String,
    pub tables: TableNames,
    pub rate_table: RateTable,
    pub payment: ToyibPayConfig,
    pub shopee: ShopeeConfig,
    pub nats_url: Option<String>,
    /// Registrations with this email become admin accounts.
    pub admin_email: Option<String>,
}

/// Sheet names inside the backing spreadsheet.
#[derive(Clone, Debug)]
pub struct TableNames {
    pub products: String,
    pub users: String,
    pub orders: String,
    pub cart: String,
    pub freight: String,
    pub payments: String,
    pub logs: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            products: "Products".into(),
            users: "Users".into(),
            orders: "Orders".into(),
            cart: "Cart".into(),
            freight: "Freight".into(),
            payments: "Payments".into(),
            logs: "SystemLogs".into(),
        }
    }
}

/// Toyib Pay gateway settings. The integration is a sandbox simulation; the
/// credentials are carried for the payment request payload only and no real
/// charge is ever made.
#[derive(Clone, Debug)]
pub struct ToyibPayConfig {
    pub merchant_id: String,
    pub api_key: String,
    pub environment: PaymentEnvironment,
    /// How long the simulated settlement waits before marking an order paid.
    pub settle_delay_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaymentEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl PaymentEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = env_or("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a number")?;

        let rate_table = match env_opt("RATE_TABLE_PATH") {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading rate table {path}"))?;
                RateTable::from_json(&json)
                    .with_context(|| format!("parsing rate table {path}"))?
            }
            None => RateTable::builtin(),
        };

        let payment = ToyibPayConfig {
            merchant_id: env_or("TOYIBPAY_MERCHANT_ID", "YOUR_MERCHANT_ID"),
            api_key: env_or("TOYIBPAY_API_KEY", "YOUR_TOYIB_PAY_API_KEY"),
            environment: match env_or("TOYIBPAY_ENV", "sandbox").as_str() {
                "production" => PaymentEnvironment::Production,
                _ => PaymentEnvironment::Sandbox,
            },
            settle_delay_ms: env_or("PAYMENT_SETTLE_DELAY_MS", "3000")
                .parse()
                .context("PAYMENT_SETTLE_DELAY_MS must be a number")?,
        };

        Ok(Self {
            app_name: env_or("APP_NAME", "Global Marketplace"),
            version: env_or("APP_VERSION", env!("CARGO_PKG_VERSION")),
            port,
            gas_url: env_opt("GAS_URL"),
            spreadsheet_name: env_or("SPREADSHEET_NAME", "GlobalMarketplace_Data"),
            tables: TableNames::default(),
            rate_table,
            payment,
            shopee: ShopeeConfig::from_env()?,
            nats_url: env_opt("NATS_URL"),
            admin_email: env_opt("ADMIN_EMAIL"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
