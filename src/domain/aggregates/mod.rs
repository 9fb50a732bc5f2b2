//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartItem, CartSummary};
pub use order::{LineItem, Order, OrderError, OrderStatus, PaymentStatus};
pub use product::{Category, Product, ProductSource};
