//! Service layer: orchestration between HTTP handlers and repositories.
//!
//! - [`checkout`] - cart → order conversion with payment-request generation
//! - [`reconcile`] - webhook-driven payment reconciliation engine
//! - [`notify`] - best-effort notification collaborator stub

pub mod checkout;
pub mod notify;
pub mod reconcile;
