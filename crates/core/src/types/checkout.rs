//! Order-creation wire types.
//!
//! These are the JSON bodies exchanged between the cart library and the
//! server's `POST /orders` endpoint, kept in core so both sides share one
//! definition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};
use super::status::PaymentMethod;

/// One `{product, quantity}` entry within an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductId,
    pub quantity: i32,
}

/// The body of an order-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user: UserId,
    pub items: Vec<LineItem>,
    #[serde(rename = "totalAmount")]
    pub total_amount: Decimal,
    #[serde(rename = "shippingAddress")]
    pub shipping_address: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
}
