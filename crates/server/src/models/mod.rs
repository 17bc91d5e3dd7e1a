//! Domain models for the catalog and order collections.

pub mod order;
pub mod product;

pub use order::{LineItemView, Order, OrderView, StatusUpdate};
pub use product::{NewProduct, Product, ProductUpdate};
