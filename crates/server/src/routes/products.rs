//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use quickmeds_core::ProductId;

use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;
use crate::validation::{PRODUCT_CREATE, PRODUCT_UPDATE, validate};

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.store().list_products(query.search.as_deref()).await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state.store().get_product(id).await?;
    Ok(Json(product))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Product>)> {
    validate(&payload, PRODUCT_CREATE).map_err(AppError::Validation)?;
    let new: NewProduct =
        serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = state.store().create_product(new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /products/{id}`
///
/// Only allow-listed fields are writable; an unknown key fails
/// deserialization and the record is never touched.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<Value>,
) -> Result<Json<Product>> {
    validate(&payload, PRODUCT_UPDATE).map_err(AppError::Validation)?;
    let update: ProductUpdate =
        serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let product = state.store().update_product(id, update).await?;
    Ok(Json(product))
}

/// `DELETE /products/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    state.store().delete_product(id).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}
