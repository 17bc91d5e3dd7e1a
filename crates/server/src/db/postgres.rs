//! `PostgreSQL` implementation of the [`Store`] trait.
//!
//! Uses the sqlx runtime query API so the crate builds without a live
//! database. The multi-item stock sequences in [`place_order`] and
//! [`cancel_order`] each run inside one transaction; the conditional
//! `stock >= quantity` update takes a row lock, so concurrent orders
//! against the same product serialize instead of racing stock negative.
//!
//! [`place_order`]: Store::place_order
//! [`cancel_order`]: Store::cancel_order

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use quickmeds_core::{
    NewOrder, OrderId, OrderStatus, PaymentStatus, Price, ProductId, UserId,
};

use crate::models::{LineItemView, NewProduct, OrderView, Product, ProductUpdate};
use crate::models::product::DEFAULT_IMAGE;

use super::{Store, StoreError};

/// Store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (used by the CLI seed command).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch expanded line items for a set of orders, grouped by order id.
    async fn fetch_items(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<LineItemView>>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT oi.order_id, oi.product_id, oi.quantity,
                   p.id AS p_id, p.name AS p_name, p.category AS p_category,
                   p.price AS p_price, p.description AS p_description,
                   p.image AS p_image, p.stock AS p_stock,
                   p.requires_prescription AS p_requires_prescription,
                   p.created_at AS p_created_at, p.updated_at AS p_updated_at
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.position
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<LineItemView>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            let item = row.into_view()?;
            grouped.entry(order_id).or_default().push(item);
        }
        Ok(grouped)
    }

    /// Assemble expanded views for already-fetched order rows.
    async fn expand_orders(&self, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.fetch_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let line_items = items.remove(&row.id).unwrap_or_default();
                row.into_view(line_items)
            })
            .collect()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let rows = match search {
            Some(term) => {
                sqlx::query_as::<_, ProductRow>(
                    r"
                    SELECT id, name, category, price, description, image, stock,
                           requires_prescription, created_at, updated_at
                    FROM products
                    WHERE name ILIKE '%' || $1 || '%' OR category ILIKE '%' || $1 || '%'
                    ORDER BY created_at
                    ",
                )
                .bind(term)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(
                    r"
                    SELECT id, name, category, price, description, image, stock,
                           requires_prescription, created_at, updated_at
                    FROM products
                    ORDER BY created_at
                    ",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, image, stock,
                   requires_prescription, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map_or(Err(StoreError::ProductNotFound), ProductRow::into_product)
    }

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let name = new.name.trim().to_owned();
        let category = new.category.trim().to_owned();
        let image = new.image.unwrap_or_else(|| DEFAULT_IMAGE.to_owned());
        let stock = new.stock.unwrap_or(0);
        let requires_prescription = new.requires_prescription.unwrap_or(false);

        let (id, created_at, updated_at) =
            sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>)>(
                r"
                INSERT INTO products
                    (name, category, price, description, image, stock, requires_prescription)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, created_at, updated_at
                ",
            )
            .bind(&name)
            .bind(&category)
            .bind(new.price.amount())
            .bind(&new.description)
            .bind(&image)
            .bind(stock)
            .bind(requires_prescription)
            .fetch_one(&self.pool)
            .await?;

        Ok(Product {
            id: ProductId::new(id),
            name,
            category,
            price: new.price,
            description: new.description,
            image,
            stock,
            requires_prescription,
            created_at,
            updated_at,
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, description, image, stock,
                   requires_prescription, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::ProductNotFound);
        };
        let mut product = row.into_product()?;
        update.apply_to(&mut product);

        let updated_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r"
            UPDATE products
            SET name = $2, category = $3, price = $4, description = $5,
                image = $6, stock = $7, requires_prescription = $8,
                updated_at = now()
            WHERE id = $1
            RETURNING updated_at
            ",
        )
        .bind(id.as_uuid())
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price.amount())
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.stock)
        .bind(product.requires_prescription)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        product.updated_at = updated_at;
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProductNotFound);
        }
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<OrderView>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_amount, shipping_address, payment_method,
                   status, payment_status, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        self.expand_orders(rows).await
    }

    async fn list_orders_for_user(&self, user: UserId) -> Result<Vec<OrderView>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_amount, shipping_address, payment_method,
                   status, payment_status, created_at, updated_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        self.expand_orders(rows).await
    }

    async fn get_order(&self, id: OrderId) -> Result<OrderView, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_amount, shipping_address, payment_method,
                   status, payment_status, created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::OrderNotFound);
        };

        let mut items = self.fetch_items(&[row.id]).await?;
        let line_items = items.remove(&row.id).unwrap_or_default();
        row.into_view(line_items)
    }

    async fn place_order(&self, order: NewOrder) -> Result<OrderView, StoreError> {
        for item in &order.items {
            if item.quantity <= 0 {
                return Err(StoreError::InvalidQuantity(item.product));
            }
        }

        let mut tx = self.pool.begin().await?;

        // All-or-nothing reservation: a failed item rolls the whole
        // transaction back, including decrements applied to earlier items.
        for item in &order.items {
            let result = sqlx::query(
                r"
                UPDATE products
                SET stock = stock - $2, updated_at = now()
                WHERE id = $1 AND stock >= $2
                ",
            )
            .bind(item.product.as_uuid())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let name = sqlx::query_scalar::<_, String>(
                    "SELECT name FROM products WHERE id = $1",
                )
                .bind(item.product.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

                return Err(name.map_or(
                    StoreError::UnknownProduct(item.product),
                    StoreError::InsufficientStock,
                ));
            }
        }

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r"
            INSERT INTO orders
                (user_id, total_amount, shipping_address, payment_method, status, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(order.user.as_uuid())
        .bind(order.total_amount)
        .bind(&order.shipping_address)
        .bind(order.payment_method.to_string())
        .bind(OrderStatus::Pending.to_string())
        .bind(PaymentStatus::Pending.to_string())
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, position, product_id, quantity)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(i32::try_from(position).map_err(|e| StoreError::DataCorruption(e.to_string()))?)
            .bind(item.product.as_uuid())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_order(OrderId::new(order_id)).await
    }

    async fn cancel_order(&self, id: OrderId) -> Result<OrderView, StoreError> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(status) = status else {
            return Err(StoreError::OrderNotFound);
        };
        let status: OrderStatus = status
            .parse()
            .map_err(StoreError::DataCorruption)?;
        if status != OrderStatus::Pending {
            return Err(StoreError::NotCancellable);
        }

        let items = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT product_id, quantity FROM order_items WHERE order_id = $1 ORDER BY position",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        // Deleted products are silently skipped (zero rows affected).
        for (product_id, quantity) in items {
            sqlx::query(
                r"
                UPDATE products
                SET stock = stock + $2, updated_at = now()
                WHERE id = $1
                ",
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(OrderStatus::Cancelled.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_order(id).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<OrderView, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = $2,
                payment_status = COALESCE($3, payment_status),
                updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(status.to_string())
        .bind(payment_status.map(|s| s.to_string()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound);
        }

        self.get_order(id).await
    }
}

/// Raw product row, converted via [`ProductRow::into_product`].
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    price: Decimal,
    description: String,
    image: String,
    stock: i32,
    requires_prescription: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, StoreError> {
        let price = Price::new(self.price).map_err(|e| {
            StoreError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            category: self.category,
            price,
            description: self.description,
            image: self.image,
            stock: self.stock,
            requires_prescription: self.requires_prescription,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Raw order row, converted via [`OrderRow::into_view`].
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount: Decimal,
    shipping_address: String,
    payment_method: String,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_view(self, items: Vec<LineItemView>) -> Result<OrderView, StoreError> {
        Ok(OrderView {
            id: OrderId::new(self.id),
            user: UserId::new(self.user_id),
            items,
            total_amount: self.total_amount,
            shipping_address: self.shipping_address,
            payment_method: self
                .payment_method
                .parse()
                .map_err(StoreError::DataCorruption)?,
            status: self.status.parse().map_err(StoreError::DataCorruption)?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(StoreError::DataCorruption)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Raw line-item row with the product columns left-joined in.
#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: Uuid,
    #[allow(dead_code)]
    product_id: Uuid,
    quantity: i32,
    p_id: Option<Uuid>,
    p_name: Option<String>,
    p_category: Option<String>,
    p_price: Option<Decimal>,
    p_description: Option<String>,
    p_image: Option<String>,
    p_stock: Option<i32>,
    p_requires_prescription: Option<bool>,
    p_created_at: Option<DateTime<Utc>>,
    p_updated_at: Option<DateTime<Utc>>,
}

impl ItemRow {
    fn into_view(self) -> Result<LineItemView, StoreError> {
        let product = match (
            self.p_id,
            self.p_name,
            self.p_category,
            self.p_price,
            self.p_description,
            self.p_image,
            self.p_stock,
            self.p_requires_prescription,
            self.p_created_at,
            self.p_updated_at,
        ) {
            (
                Some(id),
                Some(name),
                Some(category),
                Some(price),
                Some(description),
                Some(image),
                Some(stock),
                Some(requires_prescription),
                Some(created_at),
                Some(updated_at),
            ) => Some(
                ProductRow {
                    id,
                    name,
                    category,
                    price,
                    description,
                    image,
                    stock,
                    requires_prescription,
                    created_at,
                    updated_at,
                }
                .into_product()?,
            ),
            _ => None,
        };

        Ok(LineItemView {
            product,
            quantity: self.quantity,
        })
    }
}
