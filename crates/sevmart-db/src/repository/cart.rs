//! # Cart Repository (the Cart Store)
//!
//! Database operations for per-user carts and their line items.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Lifecycle                                    │
//! │                                                                         │
//! │  1. FIRST ADD                                                          │
//! │     └── add_item() → creates the user's active cart on demand          │
//! │                                                                         │
//! │  2. SHOPPING                                                           │
//! │     └── add_item()    → increment existing line or append new one      │
//! │     └── update_item() → absolute quantity (non-positive rejected)      │
//! │     └── remove_item() → delete line                                    │
//! │         Every mutation rewrites total_amount from the line list        │
//! │         in the SAME transaction.                                       │
//! │                                                                         │
//! │  3. CHECKOUT                                                           │
//! │     └── checkout() → conditional status flip, terminal for this cart   │
//! │         A second checkout FAILS (no silent success) so the caller      │
//! │         layer can never create two orders from one cart.               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Mutations are read-modify-write inside a single transaction, and status
//! transitions are conditional updates (`WHERE status = 'active'`) guarded by
//! `rows_affected`. Together with the partial unique index on
//! `carts(user_id) WHERE status = 'active'`, concurrent writers cannot lose
//! updates or create a second active cart for the same user.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sevmart_core::{Cart, CartLineItem, CartStatus, CoreError};

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct CartRow {
    id: String,
    user_id: String,
    status: CartStatus,
    total_amount: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CartItemRow {
    product_id: String,
    name: String,
    unit_price: i64,
    quantity: i64,
    added_at: DateTime<Utc>,
}

fn assemble(row: CartRow, items: Vec<CartItemRow>) -> Cart {
    Cart {
        id: row.id,
        user_id: row.user_id,
        status: row.status,
        items: items
            .into_iter()
            .map(|i| CartLineItem {
                product_id: i.product_id,
                name: i.name,
                unit_price: i.unit_price,
                quantity: i.quantity,
                added_at: i.added_at,
            })
            .collect(),
        total_amount: row.total_amount,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

const SELECT_CART: &str =
    "SELECT id, user_id, status, total_amount, created_at, updated_at FROM carts";

const SELECT_ITEMS: &str = r#"
    SELECT product_id, name, unit_price, quantity, added_at
    FROM cart_items
    WHERE cart_id = ?1
    ORDER BY added_at
"#;

async fn load_items<'e, E>(executor: E, cart_id: &str) -> DbResult<Vec<CartItemRow>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, CartItemRow>(SELECT_ITEMS)
        .bind(cart_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}

// =============================================================================
// Cart Repository
// =============================================================================

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets a user's active cart, if any.
    pub async fn get_active_cart(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "{} WHERE user_id = ?1 AND status = 'active'",
            SELECT_CART
        ))
        .bind(user_id)
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

    /// Gets a cart by ID regardless of status.
    pub async fn get_by_id(&self, cart_id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(&format!("{} WHERE id = ?1", SELECT_CART))
            .bind(cart_id)
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

    /// Adds a product to the user's active cart, creating the cart on first add.
    ///
    /// ## Snapshot Pattern
    /// `name` and `unit_price` are frozen into the line at add time; later
    /// catalog changes never alter this cart's totals.
    ///
    /// ## Behavior
    /// - Existing line for `product_id`: quantity incremented by `quantity`
    /// - Otherwise: new line appended
    /// - `total_amount` rewritten from the line list in the same transaction
    pub async fn add_item(
        &self,
        user_id: &str,
        product_id: &str,
        name: &str,
        unit_price: i64,
        quantity: i64,
    ) -> DbResult<Cart> {
        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "Adding cart item");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CartRow>(&format!(
            "{} WHERE user_id = ?1 AND status = 'active'",
            SELECT_CART
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut cart = match row {
            Some(row) => {
                let items = load_items(&mut *tx, &row.id).await?;
                assemble(row, items)
            }
            None => {
                // First add: create the active cart on demand. The partial
                // unique index rejects a concurrent second creation.
                let cart = Cart::new(Uuid::new_v4().to_string(), user_id, now);
                sqlx::query(
                    r#"
                    INSERT INTO carts (id, user_id, status, total_amount, created_at, updated_at)
                    VALUES (?1, ?2, 'active', 0, ?3, ?4)
                    "#,
                )
                .bind(&cart.id)
                .bind(&cart.user_id)
                .bind(cart.created_at)
                .bind(cart.updated_at)
                .execute(&mut *tx)
                .await?;
                cart
            }
        };

        cart.add_line(product_id, name, unit_price, quantity, now)?;
        let line = cart
            .line(product_id)
            .ok_or_else(|| DbError::Internal("cart line missing after add".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, name, unit_price, quantity, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&cart.id)
        .bind(&line.product_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .bind(line.added_at)
        .execute(&mut *tx)
        .await?;

        self.write_total(&mut tx, &cart).await?;
        tx.commit().await?;

        Ok(cart)
    }

    /// Sets a line's quantity to an absolute value.
    ///
    /// Fails with `InvalidQuantity` for non-positive quantities (an absolute
    /// update never means "remove") and `ItemNotFound` when the product has no
    /// line in the cart.
    pub async fn update_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<Cart> {
        debug!(cart_id = %cart_id, product_id = %product_id, quantity = %quantity, "Updating cart item");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut cart = self.load_for_update(&mut tx, cart_id).await?;
        cart.set_line_quantity(product_id, quantity, now)?;

        sqlx::query(
            "UPDATE cart_items SET quantity = ?3 WHERE cart_id = ?1 AND product_id = ?2",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        self.write_total(&mut tx, &cart).await?;
        tx.commit().await?;

        Ok(cart)
    }

    /// Removes a line from the cart.
    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> DbResult<Cart> {
        debug!(cart_id = %cart_id, product_id = %product_id, "Removing cart item");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut cart = self.load_for_update(&mut tx, cart_id).await?;
        cart.remove_line(product_id, now)?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        self.write_total(&mut tx, &cart).await?;
        tx.commit().await?;

        Ok(cart)
    }

    /// Transitions a cart to `checked_out`.
    ///
    /// ## Idempotency (deliberately none)
    /// The status flip is a conditional update; zero rows affected on an
    /// already checked-out cart surfaces as a conflict so a caller can never
    /// create two orders from one cart. A new cart is created on the user's
    /// next `add_item`.
    pub async fn checkout(&self, cart_id: &str) -> DbResult<Cart> {
        debug!(cart_id = %cart_id, "Checking out cart");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE carts SET status = 'checked_out', updated_at = ?2 WHERE id = ?1 AND status = 'active'",
        )
        .bind(cart_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(cart_id).await? {
                None => Err(DbError::not_found("Cart", cart_id)),
                Some(cart) => Err(DbError::Domain(CoreError::CartNotActive {
                    cart_id: cart.id,
                    current_status: cart.status.as_str().to_string(),
                })),
            };
        }

        self.get_by_id(cart_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", cart_id))
    }

    /// Loads a cart and its items inside a transaction for a mutation.
    async fn load_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        cart_id: &str,
    ) -> DbResult<Cart> {
        let row = sqlx::query_as::<_, CartRow>(&format!("{} WHERE id = ?1", SELECT_CART))
            .bind(cart_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", cart_id))?;

        let items = load_items(&mut **tx, &row.id).await?;
        Ok(assemble(row, items))
    }

    /// Writes the recomputed total alongside the line mutation.
    ///
    /// The total and the line rows commit or roll back together; a saved cart
    /// can never carry a stale total.
    async fn write_total(
        &self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        cart: &Cart,
    ) -> DbResult<()> {
        sqlx::query("UPDATE carts SET total_amount = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&cart.id)
            .bind(cart.total_amount)
            .bind(cart.updated_at)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_no_active_cart_initially() {
        let db = db().await;
        assert!(db.carts().get_active_cart("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_add_creates_cart() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo ST25 5kg", 150_000, 1)
            .await
            .unwrap();

        assert_eq!(cart.status, CartStatus::Active);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_amount, 150_000);

        // Persisted, and the same cart is returned for the user
        let again = carts.get_active_cart("user-1").await.unwrap().unwrap();
        assert_eq!(again.id, cart.id);
        assert_eq!(again.total_amount, 150_000);
    }

    #[tokio::test]
    async fn test_add_same_product_increments() {
        let db = db().await;
        let carts = db.carts();

        carts
            .add_item("user-1", "p-1", "Gạo ST25 5kg", 150_000, 2)
            .await
            .unwrap();
        let cart = carts
            .add_item("user-1", "p-1", "Gạo ST25 5kg", 150_000, 3)
            .await
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line("p-1").unwrap().quantity, 5);
        assert_eq!(cart.total_amount, 750_000);
    }

    #[tokio::test]
    async fn test_total_recomputed_after_every_mutation() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 1)
            .await
            .unwrap();
        let cart_id = cart.id.clone();

        carts
            .add_item("user-1", "p-2", "Trứng gà (10)", 32_000, 4)
            .await
            .unwrap();
        let cart = carts.update_item(&cart_id, "p-2", 2).await.unwrap();
        assert_eq!(cart.total_amount, 214_000);

        let cart = carts.remove_item(&cart_id, "p-1").await.unwrap();
        assert_eq!(cart.total_amount, 64_000);

        // The persisted row agrees with the fold over persisted lines
        let reloaded = carts.get_by_id(&cart_id).await.unwrap().unwrap();
        let fold: i64 = reloaded
            .items
            .iter()
            .map(|i| i.unit_price * i.quantity)
            .sum();
        assert_eq!(reloaded.total_amount, fold);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let db = db().await;
        let err = db
            .carts()
            .add_item("user-1", "p-1", "Gạo", 150_000, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidQuantity { .. })
        ));
        // No cart was half-created with the failed line
        assert!(db.carts().get_active_cart("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_non_positive_and_preserves_state() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 2)
            .await
            .unwrap();

        let err = carts.update_item(&cart.id, "p-1", 0).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidQuantity { .. })
        ));

        let err = carts.update_item(&cart.id, "p-1", -4).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidQuantity { .. })
        ));

        let reloaded = carts.get_by_id(&cart.id).await.unwrap().unwrap();
        assert_eq!(reloaded.line("p-1").unwrap().quantity, 2);
        assert_eq!(reloaded.total_amount, 300_000);
    }

    #[tokio::test]
    async fn test_update_missing_item() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 2)
            .await
            .unwrap();

        let err = carts.update_item(&cart.id, "ghost", 1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ItemNotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 2)
            .await
            .unwrap();

        let err = carts.remove_item(&cart.id, "ghost").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ItemNotFound { .. })));
    }

    #[tokio::test]
    async fn test_checkout_succeeds_once_then_conflicts() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 1)
            .await
            .unwrap();

        let checked_out = carts.checkout(&cart.id).await.unwrap();
        assert_eq!(checked_out.status, CartStatus::CheckedOut);

        // Second checkout must fail, not silently succeed
        let err = carts.checkout(&cart.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CartNotActive { .. })
        ));
    }

    #[tokio::test]
    async fn test_checkout_missing_cart() {
        let db = db().await;
        let err = db.carts().checkout("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_new_cart_after_checkout() {
        let db = db().await;
        let carts = db.carts();

        let first = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 1)
            .await
            .unwrap();
        carts.checkout(&first.id).await.unwrap();

        // Next add creates a fresh active cart for the user
        let second = carts
            .add_item("user-1", "p-2", "Trứng", 32_000, 1)
            .await
            .unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.total_amount, 32_000);
    }

    #[tokio::test]
    async fn test_one_active_cart_per_user_enforced() {
        let db = db().await;
        db.carts()
            .add_item("user-1", "p-1", "Gạo", 150_000, 1)
            .await
            .unwrap();

        // A second active cart for the same user violates the partial
        // unique index regardless of how it is written
        let err = sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, status, total_amount, created_at, updated_at)
            VALUES ('rogue', 'user-1', 'active', 0, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')
            "#,
        )
        .execute(db.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_mutating_checked_out_cart_fails() {
        let db = db().await;
        let carts = db.carts();

        let cart = carts
            .add_item("user-1", "p-1", "Gạo", 150_000, 1)
            .await
            .unwrap();
        carts.checkout(&cart.id).await.unwrap();

        let err = carts.update_item(&cart.id, "p-1", 3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CartNotActive { .. })
        ));
    }
}
