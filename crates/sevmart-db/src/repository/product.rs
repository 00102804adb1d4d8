//! # Product Repository
//!
//! Read-only catalog access for the cart/checkout core.
//!
//! The storefront's catalog management (create/update/upload) lives in a
//! separate admin surface; this core only reads products to validate and
//! snapshot prices at add-to-cart time. `insert` exists for tests and
//! bootstrap tooling.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use sevmart_core::Product;

/// Repository for catalog product access.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    price: i64,
    unit: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            unit: row.unit,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, unit, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Lists active products, newest first.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price, unit, is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Inserts a product (tests and bootstrap tooling).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, unit, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.unit)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn product(id: &str, price: i64, active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            price,
            unit: Some("kg".to_string()),
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        products.insert(&product("p-1", 150_000, true)).await.unwrap();

        let found = products.get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(found.price, 150_000);
        assert!(found.is_active);

        assert!(products.get_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_excludes_inactive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        products.insert(&product("p-1", 10_000, true)).await.unwrap();
        products.insert(&product("p-2", 20_000, false)).await.unwrap();

        let active = products.list_active(10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "p-1");
    }
}
