//! Freight: rate table, quoting, simulated tracking and freight orders.

pub mod quote;
pub mod rates;
pub mod tracker;

pub use quote::{
    calculate, DeliveryEstimate, Dimensions, FreightError, FreightQuote, FreightRequest,
    ShipmentType, VOLUMETRIC_DIVISOR,
};
pub use rates::{InternationalRates, LocalRates, RateTable, Zone};
pub use tracker::{Carrier, Milestone, SimulatedCarrier, TrackingEvent, TrackingStatus, MILESTONES};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::Money;
use crate::sync::{LogLevel, SyncHandle};

/// A booked shipment. Orders are created already priced and sit at `pending`
/// until a human picks them up; there is no automated lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FreightOrder {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    #[serde(flatten)]
    pub request: FreightRequest,
    pub cost: Money,
    pub status: FreightOrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreightOrderStatus {
    #[default]
    Pending,
}

/// Quoting and tracking, wrapped with the audit logging the storefront does
/// on every calculation. The rate table and carrier are injected; swapping
/// the simulation for a real courier never touches this type's callers.
pub struct FreightService {
    rates: Arc<RateTable>,
    carrier: Arc<dyn Carrier>,
    sync: SyncHandle,
}

impl FreightService {
    pub fn new(rates: Arc<RateTable>, carrier: Arc<dyn Carrier>, sync: SyncHandle) -> Self {
        Self { rates, carrier, sync }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn quote(&self, req: &FreightRequest, user: &str) -> Result<FreightQuote, FreightError> {
        let quote = quote::calculate(&self.rates, req)?;
        tracing::info!(
            kind = req.kind_label(),
            weight_kg = req.weight_kg,
            cost = %quote.cost,
            "freight calculated"
        );
        self.sync.log(
            LogLevel::Info,
            format!(
                "Freight calculation - Type: {}, Weight: {}kg, Cost: RM{}",
                req.kind_label(),
                req.weight_kg,
                quote.cost.amount()
            ),
            user,
            "freight",
        );
        Ok(quote)
    }

    pub async fn track(&self, tracking_number: &str, user: &str) -> Result<TrackingStatus, FreightError> {
        let status = self.carrier.track(tracking_number).await?;
        self.sync.log(
            LogLevel::Info,
            format!("Shipment tracked: {} - Status: {}", status.tracking_number, status.status),
            user,
            "freight",
        );
        Ok(status)
    }

    /// Prices the request and builds a pending freight order for the given
    /// customer. Persisting and mirroring the order is the caller's job.
    pub fn create_order(
        &self,
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        request: FreightRequest,
    ) -> Result<FreightOrder, FreightError> {
        let quote = quote::calculate(&self.rates, &request)?;
        let order = FreightOrder {
            id: format!("FRT-{:08}", rand::random::<u32>()),
            user_id: user_id.into(),
            user_email: user_email.into(),
            request,
            cost: quote.cost,
            status: FreightOrderStatus::Pending,
            created_at: Utc::now(),
        };
        tracing::info!(id = %order.id, cost = %order.cost, "freight order created");
        Ok(order)
    }
}
