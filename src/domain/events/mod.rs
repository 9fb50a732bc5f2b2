//! Domain events, serialized to JSON when a message bus is configured.

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Order(OrderEvent),
    Catalog(CatalogEvent),
    User(UserEvent),
    Freight(FreightEvent),
}

impl DomainEvent {
    /// Bus subject the event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(_) => "marketplace.orders",
            Self::Catalog(_) => "marketplace.catalog",
            Self::User(_) => "marketplace.users",
            Self::Freight(_) => "marketplace.freight",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, order_number: String, total: Decimal },
    Paid { order_id: String },
    Cancelled { order_id: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    ProductsImported { source: String, count: usize },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UserEvent {
    Registered { user_id: String, email: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FreightEvent {
    OrderCreated { freight_order_id: String, cost: Decimal },
}
