//! Storefront domain: aggregates, value objects and events.

pub mod aggregates;
pub mod events;
pub mod value_objects;

pub use aggregates::{
    Cart, CartError, CartItem, CartSummary, Category, LineItem, Order, OrderError, OrderStatus,
    PaymentStatus, Product, ProductSource,
};
pub use events::{CatalogEvent, DomainEvent, FreightEvent, OrderEvent, UserEvent};
pub use value_objects::{Language, Money, MoneyError};
