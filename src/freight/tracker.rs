//! Shipment tracking behind a swappable carrier seam.
//!
//! The only implementation today is [`SimulatedCarrier`], which fabricates a
//! plausible timeline instead of calling a courier API. Anything that speaks
//! a real carrier protocol later just implements [`Carrier`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::freight::quote::FreightError;

/// Milestones in delivery order. Serialized with the exact labels the
/// storefront shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Milestone {
    #[serde(rename = "Order placed")]
    OrderPlaced,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Picked up by courier")]
    PickedUpByCourier,
    #[serde(rename = "In transit")]
    InTransit,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

pub const MILESTONES: [Milestone; 6] = [
    Milestone::OrderPlaced,
    Milestone::Processing,
    Milestone::PickedUpByCourier,
    Milestone::InTransit,
    Milestone::OutForDelivery,
    Milestone::Delivered,
];

impl Milestone {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OrderPlaced => "Order placed",
            Self::Processing => "Processing",
            Self::PickedUpByCourier => "Picked up by courier",
            Self::InTransit => "In transit",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub at: DateTime<Utc>,
    pub milestone: Milestone,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub tracking_number: String,
    pub status: Milestone,
    pub last_updated: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub history: Vec<TrackingEvent>,
}

#[async_trait]
pub trait Carrier: Send + Sync {
    async fn track(&self, tracking_number: &str) -> Result<TrackingStatus, FreightError>;
}

/// Fabricates tracking data: a randomly chosen current milestone, a history
/// of every prior milestone on consecutive days ending today, and an
/// estimated delivery three days out.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedCarrier;

#[async_trait]
impl Carrier for SimulatedCarrier {
    async fn track(&self, tracking_number: &str) -> Result<TrackingStatus, FreightError> {
        let number = tracking_number.trim();
        if number.is_empty() {
            return Err(FreightError::InvalidInput("tracking number is required".into()));
        }
        let idx = rand::thread_rng().gen_range(0..MILESTONES.len());
        Ok(Self::status_at(number, idx))
    }
}

impl SimulatedCarrier {
    fn status_at(tracking_number: &str, milestone_idx: usize) -> TrackingStatus {
        let now = Utc::now();
        let history = MILESTONES[..=milestone_idx]
            .iter()
            .enumerate()
            .map(|(i, m)| TrackingEvent {
                at: now - Duration::days((milestone_idx - i) as i64),
                milestone: *m,
            })
            .collect();
        TrackingStatus {
            tracking_number: tracking_number.to_string(),
            status: MILESTONES[milestone_idx],
            last_updated: now,
            estimated_delivery: now + Duration::days(3),
            history,
        }
    }
}
