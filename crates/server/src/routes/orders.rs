//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;

use quickmeds_core::{NewOrder, OrderId, UserId};

use crate::error::{AppError, Result};
use crate::models::{OrderView, StatusUpdate};
use crate::state::AppState;
use crate::validation::{ORDER_CREATE, validate};

/// `GET /orders`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<OrderView>>> {
    let orders = state.store().list_orders().await?;
    Ok(Json(orders))
}

/// `GET /orders/user/{user_id}`
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state.store().list_orders_for_user(user_id).await?;
    Ok(Json(orders))
}

/// `GET /orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = state.store().get_order(id).await?;
    Ok(Json(order))
}

/// `POST /orders`
///
/// Reserves stock for every line item atomically, then persists the order
/// with status pending.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<OrderView>)> {
    validate(&payload, ORDER_CREATE).map_err(AppError::Validation)?;
    let order: NewOrder =
        serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let view = state.store().place_order(order).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `PATCH /orders/{id}/status`
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(payload): Json<Value>,
) -> Result<Json<OrderView>> {
    let update: StatusUpdate =
        serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let order = state
        .store()
        .update_order_status(id, update.status, update.payment_status)
        .await?;
    Ok(Json(order))
}

/// `POST /orders/{id}/cancel`
///
/// Only pending orders may be cancelled; stock is released back to every
/// referenced product that still exists.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let order = state.store().cancel_order(id).await?;
    Ok(Json(order))
}
