//! HTTP route handlers for the REST API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Products
//! GET    /products             - List products (?search= filters name/category)
//! GET    /products/{id}        - Single product
//! POST   /products             - Create product
//! PATCH  /products/{id}        - Partial update (allow-listed fields)
//! DELETE /products/{id}        - Delete product
//!
//! # Orders
//! GET   /orders                - List all orders (expanded line items)
//! GET   /orders/user/{userId}  - One user's orders
//! GET   /orders/{id}           - Single order
//! POST  /orders                - Place order (atomic stock reservation)
//! PATCH /orders/{id}/status    - Overwrite status / payment status
//! POST  /orders/{id}/cancel    - Cancel a pending order (releases stock)
//! ```

pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/user/{user_id}", get(orders::list_for_user))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::update_status))
        .route("/orders/{id}/cancel", post(orders::cancel))
}
