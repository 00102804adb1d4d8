//! Payment reconciliation engine.
//!
//! Consumes inbound payment-provider webhook events and drives the one
//! transition this system performs on payment state:
//! `Pending → Paid` / `PENDING → CONFIRMED`.
//!
//! ## Engine Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reconciliation Sequence                              │
//! │                                                                         │
//! │  webhook event                                                          │
//! │       │                                                                 │
//! │       ├── outbound transfer?        → Ignored(not_incoming)            │
//! │       ├── extract code from memo    → Ignored(no_code_found)           │
//! │       ├── lookup order by code      → Ignored(order_not_found)         │
//! │       ├── amount ≠ order total      → Ignored(amount_mismatch)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  mark_paid (conditional update)                                        │
//! │       ├── transitioned → Updated + fire-and-forget notification        │
//! │       └── already paid → AlreadyPaid (replayed webhook, no-op)         │
//! │                                                                         │
//! │  Every branch above is a SUCCESS to the provider. Only persistence     │
//! │  faults propagate as errors.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::ApiError;
use crate::services::notify::Notifier;
use sevmart_core::payment::{
    extract_payment_code, reconcile_decision, IgnoreReason, PaymentWebhookEvent,
    ReconcileDecision, ReconcileOutcome,
};
use sevmart_db::Database;

/// The payment reconciliation engine.
///
/// Owns every write to order payment state; no other component touches it.
#[derive(Clone)]
pub struct ReconciliationEngine {
    db: Database,
    notifier: Notifier,
}

impl ReconciliationEngine {
    /// Creates a new engine over the given store and notifier.
    pub fn new(db: Database, notifier: Notifier) -> Self {
        ReconciliationEngine { db, notifier }
    }

    /// Reconciles one inbound webhook event.
    ///
    /// Business mismatches (no code, unknown code, wrong amount, outbound
    /// transfer) return an `Ignored` outcome - the order, if any, is left
    /// untouched. Replayed deliveries of a matched event converge on
    /// `AlreadyPaid`. Only infrastructure faults return `Err`.
    pub async fn reconcile(
        &self,
        event: &PaymentWebhookEvent,
    ) -> Result<ReconcileOutcome, ApiError> {
        if !event.is_incoming() {
            return Ok(self.ignored(IgnoreReason::NotIncoming, event));
        }

        let code = match extract_payment_code(&event.memo()) {
            Some(code) => code,
            None => return Ok(self.ignored(IgnoreReason::NoCodeFound, event)),
        };

        let order = match self.db.orders().get_by_payment_code(&code).await? {
            Some(order) => order,
            None => {
                info!(payment_code = %code, "Webhook code matches no order");
                return Ok(self.ignored(IgnoreReason::OrderNotFound, event));
            }
        };

        match reconcile_decision(order.payment_status, order.total_amount, event.transfer_amount) {
            ReconcileDecision::Ignore(reason) => Ok(self.ignored(reason, event)),

            ReconcileDecision::AlreadyPaid => {
                info!(order_id = %order.id, "Webhook replay on paid order");
                Ok(ReconcileOutcome::AlreadyPaid { order_id: order.id })
            }

            ReconcileDecision::MarkPaid => {
                let raw = serde_json::to_string(event)
                    .map_err(|e| ApiError::internal(format!("Audit serialization: {}", e)))?;

                let updated = self
                    .db
                    .orders()
                    .mark_paid(&order.id, event.reference_code.as_deref(), &raw)
                    .await?;

                if updated {
                    info!(
                        order_id = %order.id,
                        payment_code = %code,
                        amount = order.total_amount,
                        "Payment reconciled"
                    );
                    self.notifier
                        .notify_payment_received(&order.customer_id, &order.id, order.total_amount);
                    Ok(ReconcileOutcome::Updated { order_id: order.id })
                } else {
                    // A duplicate delivery won the conditional update race.
                    Ok(ReconcileOutcome::AlreadyPaid { order_id: order.id })
                }
            }
        }
    }

    fn ignored(&self, reason: IgnoreReason, event: &PaymentWebhookEvent) -> ReconcileOutcome {
        info!(
            reason = %reason,
            reference_code = event.reference_code.as_deref().unwrap_or(""),
            "Webhook ignored"
        );
        ReconcileOutcome::Ignored { reason }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sevmart_core::payment::PaymentRequest;
    use sevmart_core::{OrderStatus, PaymentStatus, ShippingAddress};
    use sevmart_db::{DbConfig, NewOrderItem};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn engine(db: &Database) -> ReconciliationEngine {
        ReconciliationEngine::new(db.clone(), Notifier::new())
    }

    /// Creates a pending 150.000₫ order carrying the payment code SEVQRAB12CD.
    async fn pending_order_fixture(db: &Database) -> String {
        let order = db
            .orders()
            .create(
                "user-1",
                vec![NewOrderItem {
                    product_id: "p-1".to_string(),
                    name: "Gạo ST25 5kg".to_string(),
                    unit_price: 150_000,
                    quantity: 1,
                }],
                &ShippingAddress {
                    receiver: "Nguyễn Văn A".to_string(),
                    phone: "0900000001".to_string(),
                    address: "12 Lê Lợi, Q1, TP.HCM".to_string(),
                },
            )
            .await
            .unwrap();

        db.orders()
            .set_payment_request(
                &order.id,
                &PaymentRequest {
                    payment_code: "SEVQRAB12CD".to_string(),
                    qr_url: "https://img.vietqr.io/image/970436-0011002233445-compact2.png"
                        .to_string(),
                    amount: 150_000,
                },
            )
            .await
            .unwrap();

        order.id
    }

    fn event(memo: &str, amount: Option<i64>) -> PaymentWebhookEvent {
        PaymentWebhookEvent {
            transfer_type: Some("in".to_string()),
            transfer_amount: amount,
            reference_code: Some("FT2608...001".to_string()),
            content: Some(memo.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_matched_webhook_transitions_order_exactly_once() {
        let db = db().await;
        let order_id = pending_order_fixture(&db).await;
        let engine = engine(&db);

        let memo = "CK tu NGUYEN VAN A SEVQRAB12CD noi dung chuyen tien";
        let outcome = engine.reconcile(&event(memo, Some(150_000))).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Updated {
                order_id: order_id.clone()
            }
        );

        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.payment.paid_at.is_some());
        assert!(order
            .payment
            .raw_webhook_payload
            .as_deref()
            .unwrap()
            .contains("SEVQRAB12CD"));
    }

    #[tokio::test]
    async fn test_replay_is_a_noop_success() {
        let db = db().await;
        let order_id = pending_order_fixture(&db).await;
        let engine = engine(&db);
        let memo = "CK tu NGUYEN VAN A SEVQRAB12CD";

        engine.reconcile(&event(memo, Some(150_000))).await.unwrap();
        let first_paid_at = db
            .orders()
            .get_by_id(&order_id)
            .await
            .unwrap()
            .unwrap()
            .payment
            .paid_at
            .unwrap();

        // Same payload delivered again
        let outcome = engine.reconcile(&event(memo, Some(150_000))).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::AlreadyPaid {
                order_id: order_id.clone()
            }
        );

        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment.paid_at.unwrap(), first_paid_at);
    }

    #[tokio::test]
    async fn test_amount_mismatch_leaves_order_untouched() {
        let db = db().await;
        let order_id = pending_order_fixture(&db).await;
        let engine = engine(&db);

        let outcome = engine
            .reconcile(&event("CK SEVQRAB12CD", Some(140_000)))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Ignored {
                reason: IgnoreReason::AmountMismatch
            }
        );

        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment.paid_at.is_none());
    }

    #[tokio::test]
    async fn test_memo_without_code_is_ignored() {
        let db = db().await;
        pending_order_fixture(&db).await;

        let outcome = engine(&db)
            .reconcile(&event("tien rau thang 7", Some(150_000)))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Ignored {
                reason: IgnoreReason::NoCodeFound
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_code_is_ignored() {
        let db = db().await;
        pending_order_fixture(&db).await;

        let outcome = engine(&db)
            .reconcile(&event("CK SEVQRZZZZZZ", Some(150_000)))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Ignored {
                reason: IgnoreReason::OrderNotFound
            }
        );
    }

    #[tokio::test]
    async fn test_outbound_transfer_is_ignored() {
        let db = db().await;
        pending_order_fixture(&db).await;

        let mut ev = event("CK SEVQRAB12CD", Some(150_000));
        ev.transfer_type = Some("out".to_string());

        let outcome = engine(&db).reconcile(&ev).await.unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::Ignored {
                reason: IgnoreReason::NotIncoming
            }
        );
    }

    #[tokio::test]
    async fn test_event_without_amount_still_reconciles() {
        let db = db().await;
        let order_id = pending_order_fixture(&db).await;

        let outcome = engine(&db)
            .reconcile(&event("CK SEVQRAB12CD", None))
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::Updated { order_id });
    }

    #[tokio::test]
    async fn test_legacy_code_reconciles() {
        let db = db().await;
        let order = db
            .orders()
            .create(
                "user-2",
                vec![NewOrderItem {
                    product_id: "p-2".to_string(),
                    name: "Trứng gà (10)".to_string(),
                    unit_price: 32_000,
                    quantity: 1,
                }],
                &ShippingAddress {
                    receiver: "Trần Thị B".to_string(),
                    phone: "0900000002".to_string(),
                    address: "5 Hai Bà Trưng, Hà Nội".to_string(),
                },
            )
            .await
            .unwrap();
        db.orders()
            .set_payment_request(
                &order.id,
                &PaymentRequest {
                    payment_code: "NHFOOD-7K2M9P".to_string(),
                    qr_url: "https://img.vietqr.io/image/legacy.png".to_string(),
                    amount: 32_000,
                },
            )
            .await
            .unwrap();

        let outcome = engine(&db)
            .reconcile(&event("chuyen khoan nhfood-7k2m9p", Some(32_000)))
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::Updated { order_id: order.id });
    }
}
