//! Freight quote computation.
//!
//! Pure functions over an injected [`RateTable`]; no clock, no I/O. The
//! service layer wraps this with logging and order creation.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::Money;
use crate::freight::rates::RateTable;

/// IATA air-freight divisor: cm³ / 5000 = kg.
pub const VOLUMETRIC_DIVISOR: f64 = 5000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FreightError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown destination zone: {0}")]
    UnknownZone(String),
}

/// Package dimensions in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Dimensions {
    pub fn new(length_cm: f64, width_cm: f64, height_cm: f64) -> Self {
        Self { length_cm, width_cm, height_cm }
    }

    pub fn volumetric_weight_kg(&self) -> f64 {
        (self.length_cm * self.width_cm * self.height_cm) / VOLUMETRIC_DIVISOR
    }

    fn validate(&self) -> Result<(), FreightError> {
        for side in [self.length_cm, self.width_cm, self.height_cm] {
            if !side.is_finite() || side <= 0.0 {
                return Err(FreightError::InvalidInput(format!(
                    "dimensions must be positive centimeters, got {side}"
                )));
            }
        }
        Ok(())
    }
}

/// Parses the storefront's `LxWxH` form, e.g. `50x40x30`.
impl FromStr for Dimensions {
    type Err = FreightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('x').collect();
        if parts.len() != 3 {
            return Err(FreightError::InvalidInput(format!(
                "expected dimensions as LxWxH in cm, got {s:?}"
            )));
        }
        let mut sides = [0.0f64; 3];
        for (slot, part) in sides.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| FreightError::InvalidInput(format!("bad dimension {part:?}")))?;
        }
        let dims = Self::new(sides[0], sides[1], sides[2]);
        dims.validate()?;
        Ok(dims)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShipmentType {
    Local,
    International { zone_id: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FreightRequest {
    #[serde(flatten)]
    pub shipment: ShipmentType,
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions_cm: Option<Dimensions>,
}

impl FreightRequest {
    pub fn local(weight_kg: f64) -> Self {
        Self { shipment: ShipmentType::Local, weight_kg, dimensions_cm: None }
    }

    pub fn international(zone_id: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            shipment: ShipmentType::International { zone_id: zone_id.into() },
            weight_kg,
            dimensions_cm: None,
        }
    }

    pub fn with_dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions_cm = Some(dims);
        self
    }

    /// Label used in logs: `local` or the zone id.
    pub fn kind_label(&self) -> &str {
        match &self.shipment {
            ShipmentType::Local => "local",
            ShipmentType::International { zone_id } => zone_id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub min_days: u32,
    pub max_days: u32,
}

impl DeliveryEstimate {
    pub fn local() -> Self {
        Self { min_days: 1, max_days: 3 }
    }

    pub fn international() -> Self {
        Self { min_days: 3, max_days: 7 }
    }
}

impl fmt::Display for DeliveryEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} business days", self.min_days, self.max_days)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FreightQuote {
    pub cost: Money,
    pub chargeable_weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumetric_weight_kg: Option<f64>,
    /// Human-readable formula, mirrored from what the storefront displays.
    pub breakdown: String,
    pub delivery: DeliveryEstimate,
    /// Set when the computed freight cost, not the order subtotal, exceeds
    /// the table's free-shipping threshold. Longstanding storefront behavior;
    /// kept as-is.
    pub free_shipping_eligible: bool,
}

/// Prices a shipment against the given rate table.
///
/// Local shipments ignore dimensions; international ones charge the greater
/// of actual and volumetric weight when dimensions are supplied. Costs are
/// rounded half-up to 2dp in MYR.
pub fn calculate(rates: &RateTable, req: &FreightRequest) -> Result<FreightQuote, FreightError> {
    let weight = req.weight_kg;
    if !weight.is_finite() || weight <= 0.0 {
        return Err(FreightError::InvalidInput(format!(
            "weight must be a positive number of kilograms, got {weight}"
        )));
    }
    if let Some(dims) = &req.dimensions_cm {
        dims.validate()?;
    }

    match &req.shipment {
        ShipmentType::Local => {
            let cost = round_money(rates.local.base_rate + to_decimal(weight)? * rates.local.per_kg);
            let eligible = cost > rates.local.free_shipping_threshold;
            let breakdown = format!(
                "Base Rate: RM {} + RM {}/kg x {}kg = RM {:.2}",
                rates.local.base_rate, rates.local.per_kg, weight, cost
            );
            Ok(FreightQuote {
                cost: Money::myr(cost),
                chargeable_weight_kg: weight,
                volumetric_weight_kg: None,
                breakdown,
                delivery: DeliveryEstimate::local(),
                free_shipping_eligible: eligible,
            })
        }
        ShipmentType::International { zone_id } => {
            let zone = rates
                .zone(zone_id)
                .ok_or_else(|| FreightError::UnknownZone(zone_id.clone()))?;
            let volumetric = req.dimensions_cm.map(|d| d.volumetric_weight_kg());
            let chargeable = match volumetric {
                Some(v) => weight.max(v),
                None => weight,
            };
            let cost = round_money(zone.base_rate + to_decimal(chargeable)? * zone.per_kg);
            let mut breakdown = format!(
                "Zone: {}. Base Rate: RM {} + RM {}/kg x {}kg = RM {:.2}",
                zone.name, zone.base_rate, zone.per_kg, chargeable, cost
            );
            if let Some(v) = volumetric {
                breakdown.push_str(&format!(" (volumetric weight: {v:.2} kg)"));
            }
            breakdown.push_str(". Customs duties and taxes may apply");
            Ok(FreightQuote {
                cost: Money::myr(cost),
                chargeable_weight_kg: chargeable,
                volumetric_weight_kg: volumetric,
                breakdown,
                delivery: DeliveryEstimate::international(),
                free_shipping_eligible: false,
            })
        }
    }
}

fn to_decimal(weight: f64) -> Result<Decimal, FreightError> {
    Decimal::try_from(weight)
        .map_err(|_| FreightError::InvalidInput(format!("weight {weight} is not representable")))
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateTable {
        RateTable::builtin()
    }

    #[test]
    fn test_local_flat_formula() {
        let quote = calculate(&rates(), &FreightRequest::local(10.0)).unwrap();
        assert_eq!(quote.cost.amount(), Decimal::new(30, 0));
        assert_eq!(quote.cost.currency(), "MYR");
        assert_eq!(quote.chargeable_weight_kg, 10.0);
        assert_eq!(quote.volumetric_weight_kg, None);
        assert_eq!(quote.delivery, DeliveryEstimate::local());
        assert!(quote.breakdown.contains("Base Rate: RM 10 + RM 2/kg x 10kg"));
    }

    #[test]
    fn test_local_cost_increases_with_weight() {
        let table = rates();
        let mut last = Decimal::MIN;
        for tenths in 1..200u32 {
            let weight = f64::from(tenths) / 10.0;
            let cost = calculate(&table, &FreightRequest::local(weight)).unwrap().cost.amount();
            assert!(cost > last, "cost must grow with weight, {weight}kg gave {cost}");
            last = cost;
        }
    }

    #[test]
    fn test_international_zone_formula() {
        let quote = calculate(&rates(), &FreightRequest::international("asia", 5.0)).unwrap();
        assert_eq!(quote.cost.amount(), Decimal::new(120, 0));
        assert_eq!(quote.delivery, DeliveryEstimate::international());
        assert!(quote.breakdown.contains("Customs duties and taxes may apply"));
    }

    #[test]
    fn test_volumetric_weight_wins_when_larger() {
        let req = FreightRequest::international("asia", 2.0)
            .with_dimensions(Dimensions::new(50.0, 40.0, 30.0));
        let quote = calculate(&rates(), &req).unwrap();
        // 50*40*30 / 5000 = 12kg, above the 2kg actual weight
        assert_eq!(quote.volumetric_weight_kg, Some(12.0));
        assert_eq!(quote.chargeable_weight_kg, 12.0);
        assert_eq!(quote.cost.amount(), Decimal::new(204, 0));
    }

    #[test]
    fn test_actual_weight_wins_when_larger() {
        let req = FreightRequest::international("asia", 20.0)
            .with_dimensions(Dimensions::new(10.0, 10.0, 10.0));
        let quote = calculate(&rates(), &req).unwrap();
        assert_eq!(quote.volumetric_weight_kg, Some(0.2));
        assert_eq!(quote.chargeable_weight_kg, 20.0);
        assert_eq!(quote.cost.amount(), Decimal::new(300, 0));
    }

    #[test]
    fn test_unknown_zone_is_an_error_not_a_default() {
        let err = calculate(&rates(), &FreightRequest::international("mars", 5.0)).unwrap_err();
        assert_eq!(err, FreightError::UnknownZone("mars".into()));
    }

    #[test]
    fn test_nonpositive_and_nonfinite_weights_rejected() {
        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = calculate(&rates(), &FreightRequest::local(bad)).unwrap_err();
            assert!(matches!(err, FreightError::InvalidInput(_)), "weight {bad} must be rejected");
        }
    }

    #[test]
    fn test_bad_dimensions_rejected() {
        let req = FreightRequest::international("asia", 5.0)
            .with_dimensions(Dimensions::new(50.0, -1.0, 30.0));
        assert!(matches!(calculate(&rates(), &req), Err(FreightError::InvalidInput(_))));
    }

    #[test]
    fn test_local_ignores_dimensions() {
        let req = FreightRequest::local(2.0).with_dimensions(Dimensions::new(50.0, 40.0, 30.0));
        let quote = calculate(&rates(), &req).unwrap();
        assert_eq!(quote.cost.amount(), Decimal::new(14, 0));
        assert_eq!(quote.volumetric_weight_kg, None);
    }

    #[test]
    fn test_free_shipping_flag_compares_cost_to_threshold() {
        // 10 + 50*2 = 110 > 100: flagged even though nothing about the order
        // subtotal was consulted.
        let heavy = calculate(&rates(), &FreightRequest::local(50.0)).unwrap();
        assert!(heavy.free_shipping_eligible);
        let light = calculate(&rates(), &FreightRequest::local(10.0)).unwrap();
        assert!(!light.free_shipping_eligible);
        // exactly at the bar stays unflagged (strict comparison)
        let at_bar = calculate(&rates(), &FreightRequest::local(45.0)).unwrap();
        assert_eq!(at_bar.cost.amount(), Decimal::new(100, 0));
        assert!(!at_bar.free_shipping_eligible);
    }

    #[test]
    fn test_fractional_weights_round_half_up() {
        // 10 + 1.33*2 = 12.66, exact at 2dp
        let quote = calculate(&rates(), &FreightRequest::local(1.33)).unwrap();
        assert_eq!(quote.cost.amount(), Decimal::new(1266, 2));
        // asia: 60 + 0.125*12 = 61.5
        let quote = calculate(&rates(), &FreightRequest::international("asia", 0.125)).unwrap();
        assert_eq!(quote.cost.amount(), Decimal::new(615, 1));
    }

    #[test]
    fn test_dimensions_parse() {
        let dims: Dimensions = "50x40x30".parse().unwrap();
        assert_eq!(dims.volumetric_weight_kg(), 12.0);
        let dims: Dimensions = " 10 x 20 x 5 ".parse().unwrap();
        assert_eq!(dims, Dimensions::new(10.0, 20.0, 5.0));
        assert!("50x40".parse::<Dimensions>().is_err());
        assert!("axbxc".parse::<Dimensions>().is_err());
        assert!("50x0x30".parse::<Dimensions>().is_err());
    }
}
