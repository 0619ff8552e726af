//! Database Models

pub mod order;
pub mod product;
pub mod serde_helpers;

pub use order::{CheckoutSession, Order, OrderCreate, OrderStatus, PaymentTransaction, TimelineEntry};
pub use product::{Product, ProductCreate};
