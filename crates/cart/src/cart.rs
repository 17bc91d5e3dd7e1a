//! Shopping cart.
//!
//! Items merge by product name, every mutation writes straight back to the
//! storage backend, and checkout turns the cart into a [`NewOrder`] for the
//! server's order endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quickmeds_core::{LineItem, NewOrder, PaymentMethod, Price, ProductId, UserId};

use crate::storage::CartStorage;

/// One cart row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Row identity, distinct from the product it references.
    pub id: Uuid,
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub quantity: i32,
}

/// Snapshot of the cart for rendering: rows plus derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    /// Total unit count across all rows.
    pub count: i32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Your cart is empty")]
    Empty,
}

/// A cart bound to a storage backend.
///
/// Construct with [`Cart::load`]; the previous session's items are restored
/// from storage, with absent or corrupt payloads treated as an empty cart.
#[derive(Debug)]
pub struct Cart<S> {
    items: Vec<CartItem>,
    storage: S,
}

impl<S: CartStorage> Cart<S> {
    pub fn load(storage: S) -> Self {
        let items = storage
            .load()
            .and_then(|payload| serde_json::from_str(&payload).ok())
            .unwrap_or_default();
        Self { items, storage }
    }

    /// Adds one unit of a product. A row with the same name already in the
    /// cart absorbs the addition instead of creating a duplicate row.
    pub fn add(&mut self, product_id: ProductId, name: &str, category: &str, price: Price) {
        if let Some(item) = self.items.iter_mut().find(|i| i.name == name) {
            item.quantity += 1;
        } else {
            self.items.push(CartItem {
                id: Uuid::new_v4(),
                product_id,
                name: name.to_owned(),
                category: category.to_owned(),
                price,
                quantity: 1,
            });
        }
        self.persist();
    }

    /// Adjusts a row's quantity by a signed delta. A resulting quantity of
    /// zero or less removes the row. Unknown ids are ignored.
    pub fn change_quantity(&mut self, id: Uuid, delta: i32) {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return;
        };
        self.items[index].quantity += delta;
        if self.items[index].quantity <= 0 {
            self.items.remove(index);
        }
        self.persist();
    }

    /// Removes a row outright, whatever its quantity.
    pub fn remove(&mut self, id: Uuid) {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Empties the cart after asking `confirm`. An already-empty cart is a
    /// no-op and `confirm` is never invoked. Returns whether items were
    /// cleared.
    pub fn clear(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if self.items.is_empty() || !confirm() {
            return false;
        }
        self.items.clear();
        self.persist();
        true
    }

    #[must_use]
    pub fn view(&self) -> CartView {
        let total = self
            .items
            .iter()
            .map(|i| i.price.amount() * Decimal::from(i.quantity))
            .sum();
        let count = self.items.iter().map(|i| i.quantity).sum();
        CartView {
            items: self.items.clone(),
            total,
            count,
        }
    }

    /// Builds the order-creation payload from the cart and empties it.
    ///
    /// The caller is responsible for posting the returned [`NewOrder`] to
    /// the server; the cart itself never talks to the network.
    pub fn checkout(
        &mut self,
        user: UserId,
        shipping_address: impl Into<String>,
        payment_method: PaymentMethod,
    ) -> Result<NewOrder, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }

        let total_amount = self
            .items
            .iter()
            .map(|i| i.price.amount() * Decimal::from(i.quantity))
            .sum();
        let items = self
            .items
            .iter()
            .map(|i| LineItem {
                product: i.product_id,
                quantity: i.quantity,
            })
            .collect();

        self.items.clear();
        self.persist();

        Ok(NewOrder {
            user,
            items,
            total_amount,
            shipping_address: shipping_address.into(),
            payment_method,
        })
    }

    /// Consumes the cart, handing back the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        // Vec<CartItem> serialization cannot fail
        if let Ok(payload) = serde_json::to_string(&self.items) {
            self.storage.save(&payload);
        }
    }
}
