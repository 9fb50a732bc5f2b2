//! Freight rate table.
//!
//! The table is immutable once constructed and handed to the calculator as a
//! plain reference. Operators may override the built-in rates with a JSON
//! document using the same camelCase keys the storefront ships with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub local: LocalRates,
    pub international: InternationalRates,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRates {
    pub base_rate: Decimal,
    pub per_kg: Decimal,
    /// Bar the computed freight cost is compared against when flagging
    /// free-shipping eligibility. See `quote::calculate` for the wrinkle.
    pub free_shipping_threshold: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternationalRates {
    pub zones: Vec<Zone>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub zone_id: String,
    pub name: String,
    pub base_rate: Decimal,
    pub per_kg: Decimal,
}

impl RateTable {
    /// The rates the storefront ships with.
    pub fn builtin() -> Self {
        Self {
            local: LocalRates {
                base_rate: Decimal::new(10, 0),
                per_kg: Decimal::new(2, 0),
                free_shipping_threshold: Decimal::new(100, 0),
            },
            international: InternationalRates {
                zones: vec![
                    Zone { zone_id: "asia".into(), name: "Asia".into(), base_rate: Decimal::new(60, 0), per_kg: Decimal::new(12, 0) },
                    Zone { zone_id: "europe".into(), name: "Europe".into(), base_rate: Decimal::new(75, 0), per_kg: Decimal::new(15, 0) },
                    Zone { zone_id: "america".into(), name: "America".into(), base_rate: Decimal::new(90, 0), per_kg: Decimal::new(18, 0) },
                    Zone { zone_id: "others".into(), name: "Other Regions".into(), base_rate: Decimal::new(100, 0), per_kg: Decimal::new(20, 0) },
                ],
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Exact-match zone lookup. Zone ids are lowercase by convention.
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.international.zones.iter().find(|z| z.zone_id == zone_id)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::builtin()
    }
}
