//! # Order Repository
//!
//! Database operations for orders: creation at checkout, payment-request
//! persistence, reconciliation writes, and read-only projections.
//!
//! ## Order State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order State Writes                                │
//! │                                                                         │
//! │  1. CREATE (checkout)                                                  │
//! │     └── create() → status PENDING, payment Pending                     │
//! │         total_amount fixed from the item list, never recomputed        │
//! │                                                                         │
//! │  2. PAYMENT REQUEST                                                    │
//! │     └── set_payment_request() → payment_code + qr_url                  │
//! │         Write-once: an existing code is returned untouched.            │
//! │         Globally unique (partial unique index); a collision surfaces   │
//! │         as UniqueViolation so the caller retries with a longer suffix. │
//! │                                                                         │
//! │  3. RECONCILIATION                                                     │
//! │     └── mark_paid() → conditional UPDATE WHERE payment_status='pending'│
//! │         payment Paid, status CONFIRMED, paid_at, audit payload.        │
//! │         Zero rows affected = already paid = replay-safe no-op.         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sevmart_core::money::line_total;
use sevmart_core::payment::PaymentRequest;
use sevmart_core::{
    Money, Order, OrderItem, OrderStatus, PaymentInfo, PaymentStatus, ShippingAddress,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

// =============================================================================
// Input / Projection Types
// =============================================================================

/// A line to be frozen into an order at creation time.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

/// Read-only status projection for clients polling an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusView {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_amount: i64,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    total_amount: i64,
    shipping_receiver: String,
    shipping_phone: String,
    shipping_address: String,
    payment_code: Option<String>,
    qr_url: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    reference_code: Option<String>,
    raw_webhook_payload: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: String,
    name: String,
    unit_price: i64,
    quantity: i64,
}

fn assemble(row: OrderRow, items: Vec<OrderItemRow>) -> Order {
    Order {
        id: row.id,
        customer_id: row.customer_id,
        status: row.status,
        payment_status: row.payment_status,
        total_amount: row.total_amount,
        items: items
            .into_iter()
            .map(|i| OrderItem {
                id: i.id,
                order_id: i.order_id,
                product_id: i.product_id,
                name: i.name,
                unit_price: i.unit_price,
                quantity: i.quantity,
            })
            .collect(),
        shipping: ShippingAddress {
            receiver: row.shipping_receiver,
            phone: row.shipping_phone,
            address: row.shipping_address,
        },
        payment: PaymentInfo {
            payment_code: row.payment_code,
            qr_url: row.qr_url,
            paid_at: row.paid_at,
            reference_code: row.reference_code,
            raw_webhook_payload: row.raw_webhook_payload,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, customer_id, status, payment_status, total_amount,
           shipping_receiver, shipping_phone, shipping_address,
           payment_code, qr_url, paid_at, reference_code, raw_webhook_payload,
           created_at, updated_at
    FROM orders
"#;

async fn load_items<'e, E>(executor: E, order_id: &str) -> DbResult<Vec<OrderItemRow>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, OrderItemRow>(
        r#"
        SELECT id, order_id, product_id, name, unit_price, quantity
        FROM order_items
        WHERE order_id = ?1
        "#,
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(items)
}

// =============================================================================
// Order Repository
// =============================================================================

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order from frozen checkout lines.
    ///
    /// `total_amount` is computed here, once, from the item list. It is the
    /// fixed amount payments reconcile against and is never recomputed.
    pub async fn create(
        &self,
        customer_id: &str,
        items: Vec<NewOrderItem>,
        shipping: &ShippingAddress,
    ) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut total = Money::zero();
        for item in &items {
            total += line_total(Money::from_vnd(item.unit_price), item.quantity)?;
        }

        debug!(id = %id, customer_id = %customer_id, total = %total, "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, status, payment_status, total_amount,
                shipping_receiver, shipping_phone, shipping_address,
                created_at, updated_at
            ) VALUES (?1, ?2, 'pending', 'pending', ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(customer_id)
        .bind(total.vnd())
        .bind(&shipping.receiver)
        .bind(&shipping.phone)
        .bind(&shipping.address)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            let row = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: id.clone(),
                product_id: item.product_id,
                name: item.name,
                unit_price: item.unit_price,
                quantity: item.quantity,
            };
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, name, unit_price, quantity)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&row.id)
            .bind(&row.order_id)
            .bind(&row.product_id)
            .bind(&row.name)
            .bind(row.unit_price)
            .bind(row.quantity)
            .execute(&mut *tx)
            .await?;
            order_items.push(row);
        }

        tx.commit().await?;

        Ok(Order {
            id,
            customer_id: customer_id.to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total_amount: total.vnd(),
            items: order_items,
            shipping: shipping.clone(),
            payment: PaymentInfo::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, order_id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE id = ?1", SELECT_ORDER))
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let items = load_items(&self.pool, &row.id).await?;
                Ok(Some(assemble(row, items)))
            }
        }
    }

    /// Gets an order by its exact scheme-prefixed payment code.
    ///
    /// This is the reconciliation lookup: the code extracted from a webhook
    /// memo must match a stored `payment_code` verbatim.
    pub async fn get_by_payment_code(&self, payment_code: &str) -> DbResult<Option<Order>> {
        let row =
            sqlx::query_as::<_, OrderRow>(&format!("{} WHERE payment_code = ?1", SELECT_ORDER))
                .bind(payment_code)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let items = load_items(&self.pool, &row.id).await?;
                Ok(Some(assemble(row, items)))
            }
        }
    }

    /// Persists a generated payment request onto an order, write-once.
    ///
    /// - Order already carries a code: the stored order is returned untouched
    ///   (the code is immutable once set).
    /// - Another order already carries the same code: `UniqueViolation`, so
    ///   the caller can regenerate with a longer id suffix and retry.
    pub async fn set_payment_request(
        &self,
        order_id: &str,
        request: &PaymentRequest,
    ) -> DbResult<Order> {
        let order = self
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if order.payment.payment_code.is_some() {
            return Ok(order);
        }

        debug!(order_id = %order_id, payment_code = %request.payment_code, "Persisting payment request");

        sqlx::query(
            r#"
            UPDATE orders SET payment_code = ?2, qr_url = ?3, updated_at = ?4
            WHERE id = ?1 AND payment_code IS NULL
            "#,
        )
        .bind(order_id)
        .bind(&request.payment_code)
        .bind(&request.qr_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        // Zero rows affected means a concurrent writer set the code first;
        // the reload below returns whatever won.
        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Idempotently marks an order paid and confirmed.
    ///
    /// Single conditional update: only a `pending` payment transitions. The
    /// raw webhook payload is stored for audit alongside the transition.
    ///
    /// ## Returns
    /// - `true` - the order transitioned Pending → Paid now
    /// - `false` - the order was not pending (replayed webhook); no fields,
    ///   including `paid_at`, were touched
    pub async fn mark_paid(
        &self,
        order_id: &str,
        reference_code: Option<&str>,
        raw_payload: &str,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payment_status = 'paid',
                status = 'confirmed',
                paid_at = ?2,
                reference_code = ?3,
                raw_webhook_payload = ?4,
                updated_at = ?2
            WHERE id = ?1 AND payment_status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .bind(reference_code)
        .bind(raw_payload)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        debug!(order_id = %order_id, updated = %updated, "Reconciliation write");
        Ok(updated)
    }

    /// Read-only status projection for an order.
    pub async fn get_status(&self, order_id: &str) -> DbResult<Option<OrderStatusView>> {
        let row = sqlx::query_as::<_, (String, OrderStatus, PaymentStatus, i64)>(
            "SELECT id, status, payment_status, total_amount FROM orders WHERE id = ?1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(order_id, order_status, payment_status, total_amount)| OrderStatusView {
            order_id,
            order_status,
            payment_status,
            total_amount,
        }))
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE customer_id = ?1 ORDER BY created_at DESC",
            SELECT_ORDER
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = load_items(&self.pool, &row.id).await?;
            orders.push(assemble(row, items));
        }
        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
