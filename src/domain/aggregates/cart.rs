//! Cart aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

/// Order totals derived from a cart. Shipping is free above a flat subtotal
/// bar, otherwise a flat fee; tax is 6% of the subtotal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    pub session_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

fn flat_shipping() -> Decimal {
    Decimal::new(10, 0)
}

fn free_shipping_bar() -> Decimal {
    Decimal::new(100, 0)
}

fn tax_rate() -> Decimal {
    Decimal::new(6, 2) // 6%
}

impl Cart {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { session_id: session_id.into(), items: vec![], created_at: now, updated_at: now }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines, the number shown on the cart badge.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.touch();
    }

    /// Sets an absolute quantity; zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(CartError::ItemNotFound)?;
        if quantity == 0 {
            self.items.retain(|i| i.product_id != product_id);
        } else {
            item.quantity = quantity;
        }
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.touch();
        Ok(())
    }

    pub fn subtotal(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero("MYR"), |acc, i| acc.add(&i.line_total()).unwrap_or(acc))
    }

    pub fn summary(&self) -> CartSummary {
        let subtotal = self.subtotal();
        let shipping = if subtotal.amount() > free_shipping_bar() {
            Money::zero(subtotal.currency())
        } else {
            Money::new(flat_shipping(), subtotal.currency())
        };
        let tax = subtotal.scale(tax_rate()).round_2dp();
        let total = subtotal
            .add(&shipping)
            .and_then(|t| t.add(&tax))
            .unwrap_or_else(|_| subtotal.clone());
        CartSummary { subtotal, shipping, tax, total }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone)] pub enum CartError { ItemNotFound }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Item not found") }
}
