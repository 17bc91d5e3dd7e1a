//! Persistence layer for the product and order collections.
//!
//! The [`Store`] trait is the seam between route handlers and persistence.
//! Two implementations exist:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx, used by the server binary
//! - [`MemoryStore`] - in-process maps, used by unit and router tests
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p quickmeds-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use quickmeds_core::{NewOrder, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use crate::models::{NewProduct, OrderView, Product, ProductUpdate};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during store operations.
///
/// Display strings double as client-facing messages, so they keep the
/// wording of the original API.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A product addressed directly by the caller does not exist.
    #[error("Product not found")]
    ProductNotFound,

    /// An order addressed by the caller does not exist.
    #[error("Order not found")]
    OrderNotFound,

    /// A line item references a product that does not exist.
    #[error("Product {0} not found")]
    UnknownProduct(ProductId),

    /// A line item asks for more units than are in stock.
    #[error("Insufficient stock for {0}")]
    InsufficientStock(String),

    /// A line item carries a non-positive quantity.
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    /// Cancellation requested for an order that is not pending.
    #[error("Can only cancel pending orders")]
    NotCancellable,
}

/// Persistence operations over the product and order collections.
///
/// Order placement and cancellation are whole operations here rather than
/// per-item primitives so implementations can make the multi-item
/// read-check-mutate sequence atomic (a transaction in Postgres, one lock
/// in memory): either every line item commits or none does.
#[async_trait]
pub trait Store: Send + Sync {
    /// Verify the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// List products in creation order, optionally filtered by a
    /// case-insensitive substring over name and category.
    async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError>;

    /// Fetch one product.
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Create a product, applying defaults for image, stock and the
    /// prescription flag, trimming name and category.
    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Apply an allow-listed partial update to a product.
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, StoreError>;

    /// Delete a product unconditionally. Orders referencing it keep their
    /// line items; the reference dangles.
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    /// List all orders, most recent first, with expanded line items.
    async fn list_orders(&self) -> Result<Vec<OrderView>, StoreError>;

    /// List one user's orders, most recent first.
    async fn list_orders_for_user(&self, user: UserId) -> Result<Vec<OrderView>, StoreError>;

    /// Fetch one order with expanded line items.
    async fn get_order(&self, id: OrderId) -> Result<OrderView, StoreError>;

    /// Atomically reserve stock for every line item and persist the order
    /// with status pending. On any failure no stock is mutated and no
    /// order is created.
    async fn place_order(&self, order: NewOrder) -> Result<OrderView, StoreError>;

    /// Cancel a pending order, releasing stock back to each referenced
    /// product that still exists (deleted products are silently skipped),
    /// and mark it cancelled.
    async fn cancel_order(&self, id: OrderId) -> Result<OrderView, StoreError>;

    /// Overwrite an order's status, and its payment status when supplied.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<OrderView, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Case-insensitive substring match over a product's name and category.
/// The in-memory store filters with this; Postgres uses `ILIKE` with the
/// same semantics.
#[must_use]
pub fn matches_search(product: &Product, term: &str) -> bool {
    let term = term.to_lowercase();
    product.name.to_lowercase().contains(&term)
        || product.category.to_lowercase().contains(&term)
}
