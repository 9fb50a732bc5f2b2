//! Order aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Paid, Shipped, Delivered, Cancelled }

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus { #[default] Pending, Paid }

impl Order {
    pub fn create(order_number: impl Into<String>, user_id: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            order_number: order_number.into(),
            user_id: user_id.into(),
            email: email.into(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            items: vec![],
            subtotal: Money::zero("MYR"),
            shipping: Money::zero("MYR"),
            tax: Money::zero("MYR"),
            total: Money::zero("MYR"),
            created_at: now,
            updated_at: now,
            events: vec![],
        }
    }

    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.recalculate();
    }

    pub fn set_charges(&mut self, shipping: Money, tax: Money) {
        self.shipping = shipping;
        self.tax = tax;
        self.recalculate();
    }

    /// Finalizes a pending order at checkout. Empty orders are rejected.
    pub fn place(&mut self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Placed {
            order_id: self.id.clone(),
            order_number: self.order_number.clone(),
            total: self.total.amount(),
        }));
        Ok(())
    }

    pub fn mark_paid(&mut self) {
        self.payment_status = PaymentStatus::Paid;
        self.status = OrderStatus::Paid;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Paid { order_id: self.id.clone() }));
    }

    pub fn ship(&mut self) {
        self.status = OrderStatus::Shipped;
        self.touch();
    }

    pub fn deliver(&mut self) {
        self.status = OrderStatus::Delivered;
        self.touch();
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if matches!(self.status, OrderStatus::Delivered | OrderStatus::Cancelled) {
            return Err(OrderError::CannotCancel);
        }
        self.status = OrderStatus::Cancelled;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id.clone() }));
        Ok(())
    }

    fn recalculate(&mut self) {
        self.subtotal = self
            .items
            .iter()
            .fold(Money::zero(self.subtotal.currency()), |acc, i| acc.add(&i.total).unwrap_or(acc));
        self.total = self.subtotal.add(&self.shipping).unwrap_or_else(|_| self.subtotal.clone());
        self.total = self.total.add(&self.tax).unwrap_or_else(|_| self.total.clone());
        self.touch();
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone)] pub enum OrderError { NoItems, CannotCancel }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NoItems => write!(f, "No items"), Self::CannotCancel => write!(f, "Cannot cancel") }
    }
}
