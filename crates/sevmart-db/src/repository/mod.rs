//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! Each repository owns all SQL for one aggregate:
//! - [`cart::CartRepository`] - carts and their line items (the Cart Store)
//! - [`order::OrderRepository`] - orders, payment requests, reconciliation writes
//! - [`product::ProductRepository`] - read-only catalog access
//!
//! The cart and order records are the only mutable shared resources in the
//! system, and they are written exclusively through these repositories.

pub mod cart;
pub mod order;
pub mod product;
