//! In-process REST API tests.
//!
//! Builds the real router over the in-memory store and drives it with
//! `tower::ServiceExt::oneshot`, so the full HTTP surface (status codes,
//! JSON bodies, validation) is exercised without a database.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use quickmeds_server::config::ServerConfig;
use quickmeds_server::db::MemoryStore;
use quickmeds_server::routes;
use quickmeds_server::state::AppState;

fn test_app() -> Router {
    let config = ServerConfig {
        database_url: SecretString::from("postgres://test@localhost/test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    routes::routes().with_state(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn paracetamol(stock: i32) -> Value {
    json!({
        "name": "Paracetamol 500mg",
        "category": "Pain Relief",
        "price": 25.0,
        "description": "Fast-acting pain and fever relief.",
        "stock": stock
    })
}

fn cough_syrup(stock: i32) -> Value {
    json!({
        "name": "Cough Syrup",
        "category": "Cold & Flu",
        "price": 80.0,
        "description": "Soothing relief for dry coughs.",
        "stock": stock
    })
}

async fn create_product(app: &Router, body: Value) -> Value {
    let (status, product) = send(app, "POST", "/products", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    product
}

fn order_body(user: &str, items: Value) -> Value {
    json!({
        "user": user,
        "items": items,
        "totalAmount": 50.0,
        "shippingAddress": "12 High Street",
        "paymentMethod": "upi"
    })
}

const USER: &str = "5e0a7e3a-7d2b-4f6e-9f6a-3a1d2b4c5d6e";

async fn product_stock(app: &Router, id: &str) -> i64 {
    let (status, product) = send(app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    product["stock"].as_i64().expect("stock")
}

#[tokio::test]
async fn test_product_create_applies_defaults() {
    let app = test_app();
    let (status, product) = send(
        &app,
        "POST",
        "/products",
        Some(json!({
            "name": "Paracetamol 500mg",
            "category": "Pain Relief",
            "price": 25.0,
            "description": "Fast-acting pain and fever relief."
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["image"], "default-medicine.png");
    assert_eq!(product["stock"], 0);
    assert_eq!(product["requiresPrescription"], false);
    assert!(product["id"].is_string());
}

#[tokio::test]
async fn test_product_create_rejects_invalid_payload_per_field() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "ab", "price": -1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|v| v["field"].as_str().expect("field"))
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"category"));
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"description"));
}

#[tokio::test]
async fn test_missing_product_is_404_with_message() {
    let app = test_app();
    let id = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_product_update_changes_only_supplied_fields() {
    let app = test_app();
    let product = create_product(&app, paracetamol(10)).await;
    let id = product["id"].as_str().expect("id");

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/products/{id}"),
        Some(json!({ "price": 50 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 50.0);
    assert_eq!(updated["name"], product["name"]);
    assert_eq!(updated["stock"], product["stock"]);
}

#[tokio::test]
async fn test_product_update_rejects_unknown_fields() {
    let app = test_app();
    let product = create_product(&app, paracetamol(10)).await;
    let id = product["id"].as_str().expect("id");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/products/{id}"),
        Some(json!({ "isAdmin": true })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().expect("message").contains("isAdmin"));

    // Record untouched
    let (_, after) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert!(after.get("isAdmin").is_none());
    assert_eq!(after["price"], product["price"]);
}

#[tokio::test]
async fn test_product_delete_is_unconditional_then_404() {
    let app = test_app();
    let product = create_product(&app, paracetamol(10)).await;
    let id = product["id"].as_str().expect("id");

    let (status, body) = send(&app, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted");

    let (status, _) = send(&app, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_search_filters_by_name_and_category() {
    let app = test_app();
    create_product(&app, paracetamol(10)).await;
    create_product(&app, cough_syrup(5)).await;

    let (status, body) = send(&app, "GET", "/products?search=flu", None).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().expect("array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Cough Syrup");

    let (_, all) = send(&app, "GET", "/products", None).await;
    assert_eq!(all.as_array().expect("array").len(), 2);
}

#[tokio::test]
async fn test_order_creation_reserves_stock_and_expands_items() {
    let app = test_app();
    let a = create_product(&app, paracetamol(10)).await;
    let b = create_product(&app, cough_syrup(4)).await;
    let (a_id, b_id) = (a["id"].as_str().expect("id"), b["id"].as_str().expect("id"));

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(order_body(
            USER,
            json!([
                { "product": a_id, "quantity": 3 },
                { "product": b_id, "quantity": 1 }
            ]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["items"][0]["product"]["name"], "Paracetamol 500mg");

    assert_eq!(product_stock(&app, a_id).await, 7);
    assert_eq!(product_stock(&app, b_id).await, 3);

    // Expanded single-order read and the per-user listing
    let order_id = order["id"].as_str().expect("id");
    let (status, fetched) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["user"], USER);

    let (status, mine) = send(&app, "GET", &format!("/orders/user/{USER}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().expect("array").len(), 1);

    let other = uuid::Uuid::new_v4();
    let (_, none) = send(&app, "GET", &format!("/orders/user/{other}"), None).await;
    assert!(none.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_insufficient_stock_fails_without_mutating_anything() {
    let app = test_app();
    let a = create_product(&app, paracetamol(10)).await;
    let b = create_product(&app, cough_syrup(3)).await;
    let (a_id, b_id) = (a["id"].as_str().expect("id"), b["id"].as_str().expect("id"));

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(order_body(
            USER,
            json!([
                { "product": a_id, "quantity": 2 },
                { "product": b_id, "quantity": 5 }
            ]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient stock for Cough Syrup");

    // All-or-nothing: the earlier item's stock is untouched too, and no
    // order record exists.
    assert_eq!(product_stock(&app, a_id).await, 10);
    assert_eq!(product_stock(&app, b_id).await, 3);
    let (_, orders) = send(&app, "GET", "/orders", None).await;
    assert!(orders.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_order_for_unknown_product_is_404() {
    let app = test_app();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(order_body(
            USER,
            json!([{ "product": missing, "quantity": 1 }]),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        format!("Product {missing} not found")
    );
}

#[tokio::test]
async fn test_order_validation_rejects_bad_payloads() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "user": USER,
            "items": [],
            "totalAmount": 0.0,
            "shippingAddress": "12 High Street",
            "paymentMethod": "cash_on_delivery"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|v| v["field"].as_str().expect("field"))
        .collect();
    assert!(fields.contains(&"items"));
    assert!(fields.contains(&"paymentMethod"));
}

#[tokio::test]
async fn test_cancel_releases_stock_and_is_pending_only() {
    let app = test_app();
    let a = create_product(&app, paracetamol(10)).await;
    let b = create_product(&app, cough_syrup(5)).await;
    let (a_id, b_id) = (a["id"].as_str().expect("id"), b["id"].as_str().expect("id"));

    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(order_body(
            USER,
            json!([
                { "product": a_id, "quantity": 2 },
                { "product": b_id, "quantity": 1 }
            ]),
        )),
    )
    .await;
    let order_id = order["id"].as_str().expect("id");

    let (status, cancelled) =
        send(&app, "POST", &format!("/orders/{order_id}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(product_stock(&app, a_id).await, 10);
    assert_eq!(product_stock(&app, b_id).await, 5);

    let (status, body) =
        send(&app, "POST", &format!("/orders/{order_id}/cancel"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Can only cancel pending orders");
    assert_eq!(product_stock(&app, a_id).await, 10);
}

#[tokio::test]
async fn test_cancel_missing_order_is_404() {
    let app = test_app();
    let id = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "POST", &format!("/orders/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");
}

#[tokio::test]
async fn test_status_update_overwrites_unconditionally() {
    let app = test_app();
    let a = create_product(&app, paracetamol(10)).await;
    let a_id = a["id"].as_str().expect("id");

    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(order_body(USER, json!([{ "product": a_id, "quantity": 1 }]))),
    )
    .await;
    let order_id = order["id"].as_str().expect("id");

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "shipped");
    assert_eq!(updated["paymentStatus"], "pending");

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": "delivered", "paymentStatus": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["paymentStatus"], "paid");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": "lost_in_transit" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
