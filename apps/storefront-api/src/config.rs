//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, validated once at startup, and owned by the process entry point.
//! Components receive it by constructor - there is no global config state.

use serde::{Deserialize, Serialize};
use std::env;

use sevmart_core::payment::BankAccount;

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Receiving bank account embedded in QR payment requests
    pub bank: BankAccount,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./sevmart.db".to_string()),

            bank: BankAccount {
                // BIN of the receiving bank (default: Vietcombank)
                bank_code: env::var("BANK_CODE").unwrap_or_else(|_| "970436".to_string()),

                account_no: env::var("BANK_ACCOUNT_NO")
                    .unwrap_or_else(|_| "0011002233445".to_string()),

                account_name: env::var("BANK_ACCOUNT_NAME")
                    .unwrap_or_else(|_| "SEVMART JSC".to_string()),
            },
        };

        if config.bank.account_no.trim().is_empty() {
            return Err(ConfigError::MissingRequired("BANK_ACCOUNT_NO".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
