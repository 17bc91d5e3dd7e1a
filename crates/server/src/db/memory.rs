//! In-memory implementation of the [`Store`] trait.
//!
//! Backs unit and router tests. A single mutex over both collections
//! serializes every operation, which gives the same all-or-nothing,
//! no-concurrent-interleaving semantics the Postgres implementation gets
//! from its transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use quickmeds_core::{NewOrder, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use crate::models::product::DEFAULT_IMAGE;
use crate::models::{LineItemView, NewProduct, Order, OrderView, Product, ProductUpdate};

use super::{Store, StoreError, matches_search};

/// Store backed by in-process collections.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    orders: Vec<Order>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn expand(order: &Order, products: &[Product]) -> OrderView {
    let items = order
        .items
        .iter()
        .map(|item| LineItemView {
            product: products.iter().find(|p| p.id == item.product).cloned(),
            quantity: item.quantity,
        })
        .collect();

    OrderView {
        id: order.id,
        user: order.user,
        items,
        total_amount: order.total_amount,
        shipping_address: order.shipping_address.clone(),
        payment_method: order.payment_method,
        status: order.status,
        payment_status: order.payment_status,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .products
            .iter()
            .filter(|p| search.is_none_or(|term| matches_search(p, term)))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::ProductNotFound)
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let now = Utc::now();
        let product = Product {
            id: ProductId::random(),
            name: new.name.trim().to_owned(),
            category: new.category.trim().to_owned(),
            price: new.price,
            description: new.description,
            image: new.image.unwrap_or_else(|| DEFAULT_IMAGE.to_owned()),
            stock: new.stock.unwrap_or(0),
            requires_prescription: new.requires_prescription.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.lock().await;
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, StoreError> {
        let mut inner = self.inner.lock().await;
        let product = inner
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProductNotFound)?;

        update.apply_to(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::ProductNotFound)?;
        inner.products.remove(position);
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<OrderView>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .orders
            .iter()
            .rev()
            .map(|order| expand(order, &inner.products))
            .collect())
    }

    async fn list_orders_for_user(&self, user: UserId) -> Result<Vec<OrderView>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .orders
            .iter()
            .rev()
            .filter(|order| order.user == user)
            .map(|order| expand(order, &inner.products))
            .collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<OrderView, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|order| expand(order, &inner.products))
            .ok_or(StoreError::OrderNotFound)
    }

    async fn place_order(&self, order: NewOrder) -> Result<OrderView, StoreError> {
        let mut inner = self.inner.lock().await;

        // Validate every line item against tentatively-reserved stock
        // before touching anything, so a late failure mutates nothing.
        let mut reserved: HashMap<ProductId, i32> = HashMap::new();
        for item in &order.items {
            if item.quantity <= 0 {
                return Err(StoreError::InvalidQuantity(item.product));
            }
            let product = inner
                .products
                .iter()
                .find(|p| p.id == item.product)
                .ok_or(StoreError::UnknownProduct(item.product))?;
            let already = reserved.get(&product.id).copied().unwrap_or(0);
            if product.stock - already < item.quantity {
                return Err(StoreError::InsufficientStock(product.name.clone()));
            }
            reserved.insert(product.id, already + item.quantity);
        }

        let now = Utc::now();
        for product in &mut inner.products {
            if let Some(quantity) = reserved.get(&product.id) {
                product.stock -= quantity;
                product.updated_at = now;
            }
        }

        let stored = Order {
            id: OrderId::random(),
            user: order.user,
            items: order.items,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let view = expand(&stored, &inner.products);
        inner.orders.push(stored);
        Ok(view)
    }

    async fn cancel_order(&self, id: OrderId) -> Result<OrderView, StoreError> {
        let mut inner = self.inner.lock().await;

        let position = inner
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(StoreError::OrderNotFound)?;
        let order = inner.orders.get(position).ok_or(StoreError::OrderNotFound)?;
        if order.status != OrderStatus::Pending {
            return Err(StoreError::NotCancellable);
        }
        let items = order.items.clone();

        let now = Utc::now();
        // Deleted products are silently skipped.
        for item in &items {
            if let Some(product) = inner.products.iter_mut().find(|p| p.id == item.product) {
                product.stock += item.quantity;
                product.updated_at = now;
            }
        }

        let order = inner
            .orders
            .get_mut(position)
            .ok_or(StoreError::OrderNotFound)?;
        order.status = OrderStatus::Cancelled;
        order.updated_at = now;

        let order = order.clone();
        Ok(expand(&order, &inner.products))
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<OrderView, StoreError> {
        let mut inner = self.inner.lock().await;
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::OrderNotFound)?;

        order.status = status;
        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        order.updated_at = Utc::now();

        let order = order.clone();
        Ok(expand(&order, &inner.products))
    }
}
