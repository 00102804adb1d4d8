//! # sevmart-db: Database Layer for the Sevmart Storefront
//!
//! This crate owns all database operations for the storefront core.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        sevmart-db                                       │
//! │                                                                         │
//! │  apps/storefront-api                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database (pool.rs)                                                    │
//! │       ├── carts()    → CartRepository    (the Cart Store)              │
//! │       ├── orders()   → OrderRepository   (orders + reconciliation)     │
//! │       └── products() → ProductRepository (read-only catalog)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, embedded migrations)                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants Enforced Here
//! - At most one `active` cart per user (partial unique index)
//! - `payment_code` globally unique when set (partial unique index)
//! - Cart `total_amount` written in the same transaction as its line rows
//! - Order payment transition is a single conditional update (replay-safe)

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::cart::CartRepository;
pub use repository::order::{NewOrderItem, OrderRepository, OrderStatusView};
pub use repository::product::ProductRepository;
