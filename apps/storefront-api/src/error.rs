//! Error types for the Storefront API.
//!
//! Maps the layered error taxonomy onto HTTP:
//!
//! ```text
//! Validation  (bad quantity/price/missing field) → 400
//! NotFound    (cart/order/item/product absent)   → 404
//! Conflict    (checkout on non-active cart,
//!              duplicate payment code)           → 409
//! Internal    (store unavailable, bugs)          → 500
//! ```
//!
//! The payment webhook route is the exception: business mismatches there are
//! not errors at all - they are acknowledged with an "ignored" envelope and
//! only infrastructure faults surface as 5xx.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use sevmart_core::{CoreError, ValidationError};
use sevmart_db::DbError;

/// Storefront API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found: {1}")]
    NotFound(String, String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ApiError::NotFound(entity.into(), id.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_, _) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_, _) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

/// Domain errors keep their taxonomy across the HTTP boundary.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuantity { .. }
            | CoreError::InvalidPrice { .. }
            | CoreError::InvalidAmount { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ApiError::Validation(err.to_string()),

            CoreError::ItemNotFound { ref product_id } => {
                ApiError::not_found("Cart item", product_id)
            }

            CoreError::CartNotActive { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::NotFound(entity, id),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::Domain(core) => core.into(),
            DbError::ForeignKeyViolation { .. } => ApiError::Validation(err.to_string()),
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("Cart", "c-1").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_error_taxonomy() {
        let err: ApiError = CoreError::InvalidQuantity { quantity: 0 }.into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = CoreError::ItemNotFound {
            product_id: "p-1".into(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_, _)));

        let err: ApiError = CoreError::CartNotActive {
            cart_id: "c-1".into(),
            current_status: "checked_out".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_db_error_taxonomy() {
        let err: ApiError = DbError::UniqueViolation {
            field: "orders.payment_code".into(),
            value: "SEVQRAB12CD".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = DbError::PoolExhausted.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
