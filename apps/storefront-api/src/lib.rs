//! # Sevmart Storefront API
//!
//! HTTP API for the Sevmart grocery storefront: cart mutation, checkout with
//! QR payment requests, payment-webhook reconciliation, and order queries.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront API Layers                             │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes::cart  │  │ routes::payment│  │  routes::orders            ││
//! │  │                │  │                │  │                            ││
//! │  │ • active cart  │  │ • generate-qr  │  │ • order by id              ││
//! │  │ • add/update/  │  │ • order-status │  │ • customer history         ││
//! │  │   remove item  │  │ • webhook      │  │                            ││
//! │  │ • checkout     │  └───────┬────────┘  └────────────────────────────┘│
//! │  └───────┬────────┘          │                                          │
//! │          ▼                   ▼                                          │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │services::      │  │services::      │  │ services::notify           ││
//! │  │checkout        │  │reconcile       │  │ (fire-and-forget stub)     ││
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │          ▼                   ▼                                          │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │            sevmart-db (repositories over SQLite)                  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - listen port (default 8080)
//! - `DATABASE_PATH` - SQLite file path (default ./sevmart.db)
//! - `BANK_CODE` / `BANK_ACCOUNT_NO` / `BANK_ACCOUNT_NAME` - QR receiving
//!   account

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
