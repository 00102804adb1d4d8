//! Payment HTTP handlers: QR generation, order status polling, and the
//! inbound provider webhook.
//!
//! ## Webhook Contract
//! The provider retries deliveries that don't return 200, so this endpoint
//! acknowledges EVERY business outcome with 200 and an envelope:
//!
//! ```text
//! {"ok": true, "updated": true,  "orderId": "..."}       transition applied
//! {"ok": true, "updated": false, "orderId": "..."}       replay on paid order
//! {"ok": true, "updated": false, "ignored": "reason"}    no matching order etc.
//! ```
//!
//! Only infrastructure faults (store down) surface as 5xx - those are the
//! deliveries we WANT retried.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::services::checkout::attach_payment_request;
use crate::services::reconcile::ReconciliationEngine;
use crate::state::AppState;
use sevmart_core::payment::{PaymentWebhookEvent, ReconcileOutcome};
use sevmart_core::validation::validate_id;
use sevmart_db::OrderStatusView;

/// Request body for QR generation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrRequest {
    pub order_id: String,
}

/// Response for QR generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrResponse {
    pub order_id: String,
    pub payment_code: String,
    pub amount: i64,
    pub qr_url: String,
}

/// Webhook acknowledgement envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub ok: bool,
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<String>,
}

/// Generates (or returns the stored) QR payment request for an order.
pub async fn generate_qr(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateQrRequest>,
) -> Result<Json<GenerateQrResponse>, ApiError> {
    debug!(order_id = %body.order_id, "generate_qr");
    validate_id("orderId", &body.order_id)?;

    let order = state
        .db
        .orders()
        .get_by_id(&body.order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &body.order_id))?;

    let order = attach_payment_request(&state.db, &state.config.bank, &order).await?;

    // attach_payment_request only returns orders carrying a persisted code
    let payment_code = order
        .payment
        .payment_code
        .ok_or_else(|| ApiError::internal("Payment code missing after generation"))?;
    let qr_url = order
        .payment
        .qr_url
        .ok_or_else(|| ApiError::internal("QR URL missing after generation"))?;

    Ok(Json(GenerateQrResponse {
        order_id: order.id,
        payment_code,
        amount: order.total_amount,
        qr_url,
    }))
}

/// Read-only status projection for payment polling.
pub async fn order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStatusView>, ApiError> {
    validate_id("orderId", &order_id)?;

    let view = state
        .db
        .orders()
        .get_status(&order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_id))?;

    Ok(Json(view))
}

/// Inbound payment-provider webhook.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(event): Json<PaymentWebhookEvent>,
) -> Result<Json<WebhookAck>, ApiError> {
    let engine = ReconciliationEngine::new(state.db.clone(), state.notifier.clone());
    let outcome = engine.reconcile(&event).await?;

    Ok(Json(WebhookAck::from(outcome)))
}

/// Every business outcome acknowledges with `ok: true`; the provider only
/// retries transport-level failures.
impl From<ReconcileOutcome> for WebhookAck {
    fn from(outcome: ReconcileOutcome) -> Self {
        match outcome {
            ReconcileOutcome::Updated { order_id } => WebhookAck {
                ok: true,
                updated: true,
                order_id: Some(order_id),
                ignored: None,
            },
            ReconcileOutcome::AlreadyPaid { order_id } => WebhookAck {
                ok: true,
                updated: false,
                order_id: Some(order_id),
                ignored: None,
            },
            ReconcileOutcome::Ignored { reason } => WebhookAck {
                ok: true,
                updated: false,
                order_id: None,
                ignored: Some(reason.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sevmart_core::payment::IgnoreReason;

    #[test]
    fn test_ack_for_applied_transition() {
        let ack = WebhookAck::from(ReconcileOutcome::Updated {
            order_id: "o-1".to_string(),
        });
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "updated": true, "orderId": "o-1"})
        );
    }

    #[test]
    fn test_ack_for_replay() {
        let ack = WebhookAck::from(ReconcileOutcome::AlreadyPaid {
            order_id: "o-1".to_string(),
        });
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "updated": false, "orderId": "o-1"})
        );
    }

    #[test]
    fn test_ack_for_ignored_event() {
        let ack = WebhookAck::from(ReconcileOutcome::Ignored {
            reason: IgnoreReason::AmountMismatch,
        });
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "updated": false, "ignored": "amount_mismatch"})
        );
    }
}
