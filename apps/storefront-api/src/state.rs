//! Shared application state.
//!
//! The process entry point owns the database handle, configuration, and
//! notifier, and threads them through axum's `State` extractor. Components
//! never reach for globals.

use crate::config::ApiConfig;
use crate::services::notify::Notifier;
use sevmart_db::Database;

/// Shared application state, cloned per request via `Arc`.
pub struct AppState {
    /// Database handle (repositories hang off this).
    pub db: Database,

    /// Startup configuration (bank account, ports).
    pub config: ApiConfig,

    /// Best-effort notification collaborator.
    pub notifier: Notifier,
}
