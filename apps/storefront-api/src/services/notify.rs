//! Notification collaborator stub.
//!
//! Email/SMS delivery is owned by an external service; this stub keeps the
//! interface and the fire-and-forget discipline: notifications are spawned,
//! never awaited on the request path, and a failure is logged - it must never
//! fail a cart mutation or a reconciliation.

use tracing::{info, warn};

/// Notification delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Best-effort notification sender.
#[derive(Debug, Clone, Default)]
pub struct Notifier;

impl Notifier {
    /// Creates a new notifier.
    pub fn new() -> Self {
        Notifier
    }

    /// Sends an email (stub: logs the delivery).
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(to = %to, subject = %subject, body_len = body.len(), "Email dispatched");
        Ok(())
    }

    /// Sends an SMS/app message (stub: logs the delivery).
    pub async fn send_message(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        info!(to = %to, body_len = body.len(), "Message dispatched");
        Ok(())
    }

    /// Fire-and-forget payment confirmation.
    ///
    /// Spawned off the webhook path so delivery can never block or fail the
    /// reconciliation acknowledgement.
    pub fn notify_payment_received(&self, customer_id: &str, order_id: &str, amount: i64) {
        let notifier = self.clone();
        let customer_id = customer_id.to_string();
        let order_id = order_id.to_string();

        tokio::spawn(async move {
            let body = format!(
                "Đơn hàng {} đã được thanh toán ({}₫). Cảm ơn bạn đã mua sắm tại Sevmart!",
                order_id, amount
            );
            if let Err(e) = notifier.send_message(&customer_id, &body).await {
                warn!(customer_id = %customer_id, order_id = %order_id, error = %e, "Payment notification failed");
            }
        });
    }
}
