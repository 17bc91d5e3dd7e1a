//! Order model, expanded read views and status-update payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use quickmeds_core::{LineItem, OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use super::product::Product;

/// An order as stored, with unexpanded product references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item with its product reference expanded to the full document.
///
/// `product` is `None` when the referenced product has since been deleted;
/// the reference is kept dangling rather than blocking product deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemView {
    pub product: Option<Product>,
    pub quantity: i32,
}

/// An order as returned by read endpoints, with expanded line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<LineItemView>,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PATCH /orders/:id/status`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub payment_status: Option<PaymentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_payment_status_is_optional() {
        let update: StatusUpdate =
            serde_json::from_value(serde_json::json!({ "status": "shipped" }))
                .expect("valid update");
        assert_eq!(update.status, OrderStatus::Shipped);
        assert!(update.payment_status.is_none());

        let update: StatusUpdate = serde_json::from_value(serde_json::json!({
            "status": "delivered",
            "paymentStatus": "paid"
        }))
        .expect("valid update");
        assert_eq!(update.payment_status, Some(PaymentStatus::Paid));
    }

    #[test]
    fn test_status_update_rejects_unknown_status() {
        let err = serde_json::from_value::<StatusUpdate>(
            serde_json::json!({ "status": "lost_in_transit" }),
        );
        assert!(err.is_err());
    }
}
