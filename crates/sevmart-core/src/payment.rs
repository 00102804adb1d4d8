//! # Payment Module
//!
//! Payment code derivation, QR payment request construction, webhook memo
//! extraction, and the pure reconciliation decision.
//!
//! ## Reconciliation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Payment Reconciliation Flow                           │
//! │                                                                         │
//! │  Checkout                                                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  payment_code_for(order.id)  ──►  "SEVQRAB12CD"                        │
//! │  payment_request_for(...)    ──►  QR image URL with amount + code      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Customer scans QR, bank transfer carries the code in its memo          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Provider webhook ──► extract_payment_code(memo) ──► lookup order      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  reconcile_decision(status, total, amount)                             │
//! │     ├── MarkPaid      → Pending → Paid, PENDING → CONFIRMED            │
//! │     ├── AlreadyPaid   → replay-safe no-op                              │
//! │     └── Ignore(reason)→ acknowledged, order untouched                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Best-Effort Extraction?
//! The bank memo is a user-editable free-text field: senders truncate it,
//! prepend their name, or let the bank app mangle the casing. Matching is
//! therefore an explicit, isolated scan with a narrow contract (input string
//! in, optional code out), and ambiguity never propagates past this boundary.
//! Non-matches are ignored, never failed: the provider expects an
//! acknowledgement either way, or it storms the endpoint with retries.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, PaymentStatus};

// =============================================================================
// Constants
// =============================================================================

/// Scheme tag prefixed to every generated payment code.
pub const PAYMENT_CODE_TAG: &str = "SEVQR";

/// Legacy scheme tag still honoured when scanning memos.
pub const LEGACY_PAYMENT_CODE_TAG: &str = "NHFOOD-";

/// Default length of the order-id suffix used in a payment code.
///
/// Six characters of a well-distributed UUID suffix make collisions
/// negligible; the store enforces uniqueness anyway and callers retry with a
/// longer suffix on a collision.
pub const DEFAULT_CODE_SUFFIX_LEN: usize = 6;

/// QR image service endpoint (VietQR-compatible).
const QR_IMAGE_BASE: &str = "https://img.vietqr.io/image";

// =============================================================================
// Bank Account
// =============================================================================

/// The receiving bank account embedded in every payment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    /// Bank identifier (e.g. "970436" or "vietcombank").
    pub bank_code: String,
    /// Receiving account number.
    pub account_no: String,
    /// Account holder display name.
    pub account_name: String,
}

// =============================================================================
// Payment Code Generation
// =============================================================================

/// Derives the public payment code for an order id.
///
/// Takes the last `suffix_len` characters of the order id, uppercased, and
/// prefixes the scheme tag.
///
/// ## Example
/// ```rust
/// use sevmart_core::payment::payment_code_for;
///
/// let code = payment_code_for("0f3c9e1a-77aa-4c2e-9d41-6b20e1ab12cd", 6);
/// assert_eq!(code, "SEVQRAB12CD");
/// ```
pub fn payment_code_for(order_id: &str, suffix_len: usize) -> String {
    let suffix: String = order_id
        .chars()
        .rev()
        .take(suffix_len)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}{}", PAYMENT_CODE_TAG, suffix.to_uppercase())
}

/// A presentable payment request: the code to reconcile against, the QR image
/// URL to show the customer, and the amount due.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Scheme-prefixed public payment code.
    pub payment_code: String,
    /// QR image URL embedding account, amount, and code.
    pub qr_url: String,
    /// Amount due in đồng.
    pub amount: i64,
}

/// Builds the payment request for an order.
///
/// ## Errors
/// [`CoreError::InvalidAmount`] when the order total is not positive. A
/// zero-đồng QR is a provider error on scan, so it is rejected up front.
pub fn payment_request_for(
    order: &Order,
    bank: &BankAccount,
    suffix_len: usize,
) -> CoreResult<PaymentRequest> {
    if order.total_amount <= 0 {
        return Err(CoreError::InvalidAmount {
            amount: order.total_amount,
        });
    }

    let payment_code = payment_code_for(&order.id, suffix_len);
    let qr_url = build_qr_url(bank, order.total_amount, &payment_code)?;

    Ok(PaymentRequest {
        payment_code,
        qr_url,
        amount: order.total_amount,
    })
}

/// Builds the VietQR-style image URL for a payment request.
///
/// The payment code travels URL-encoded in the `addInfo` transfer description;
/// that is the field banks copy into the transfer memo the webhook later
/// reports back.
fn build_qr_url(bank: &BankAccount, amount: i64, payment_code: &str) -> CoreResult<String> {
    let base = format!(
        "{}/{}-{}-compact2.png",
        QR_IMAGE_BASE, bank.bank_code, bank.account_no
    );
    let mut url = Url::parse(&base).map_err(|e| {
        CoreError::Validation(crate::error::ValidationError::InvalidFormat {
            field: "qrUrl".to_string(),
            reason: e.to_string(),
        })
    })?;
    url.query_pairs_mut()
        .append_pair("amount", &amount.to_string())
        .append_pair("addInfo", payment_code)
        .append_pair("accountName", &bank.account_name);
    Ok(url.into())
}

// =============================================================================
// Memo Extraction
// =============================================================================

/// Best-effort extraction of a payment code from a bank-transfer memo.
///
/// Scans the text (case-insensitively) for a known scheme tag followed by an
/// alphanumeric token and returns the uppercased, scheme-prefixed code
/// (`SEVQR3F9A2B` or `NHFOOD-XYZ123`). The first plausible match wins.
///
/// Returns `None` when no tag+token pattern is found; callers treat that as
/// "ignore, do not fail" (see module docs).
///
/// ## Example
/// ```rust
/// use sevmart_core::payment::extract_payment_code;
///
/// let memo = "CK tu NGUYEN VAN A SEVQR3F9A2B noi dung chuyen tien";
/// assert_eq!(extract_payment_code(memo).as_deref(), Some("SEVQR3F9A2B"));
/// assert_eq!(extract_payment_code("tien rau thang 7"), None);
/// ```
pub fn extract_payment_code(text: &str) -> Option<String> {
    let haystack = text.to_uppercase();
    for tag in [PAYMENT_CODE_TAG, LEGACY_PAYMENT_CODE_TAG] {
        for (pos, _) in haystack.match_indices(tag) {
            let token: String = haystack[pos + tag.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if !token.is_empty() {
                return Some(format!("{}{}", tag, token));
            }
        }
    }
    None
}

// =============================================================================
// Webhook Event
// =============================================================================

/// An inbound payment notification from the payment provider.
///
/// Every field is optional: the provider's payload shape has drifted across
/// versions and a missing field must never make deserialization (and thereby
/// the acknowledgement) fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentWebhookEvent {
    /// Provider-side gateway / bank name.
    pub gateway: Option<String>,
    /// Provider-side transaction timestamp (freeform).
    pub transaction_date: Option<String>,
    /// Receiving account number as reported by the bank.
    pub account_number: Option<String>,
    /// "in" for money received, "out" for money sent.
    pub transfer_type: Option<String>,
    /// Transfer amount in đồng, when reported.
    pub transfer_amount: Option<i64>,
    /// Bank-side reference code of the transfer.
    pub reference_code: Option<String>,
    /// Bank transfer memo (primary code carrier).
    pub content: Option<String>,
    /// Secondary freeform description (fallback code carrier).
    pub description: Option<String>,
}

impl PaymentWebhookEvent {
    /// Concatenated memo text scanned for a payment code.
    pub fn memo(&self) -> String {
        let mut memo = String::new();
        if let Some(content) = &self.content {
            memo.push_str(content);
        }
        if let Some(description) = &self.description {
            if !memo.is_empty() {
                memo.push(' ');
            }
            memo.push_str(description);
        }
        memo
    }

    /// Whether the event reports money received (outbound transfers are
    /// ignored). A missing `transferType` is treated as incoming.
    pub fn is_incoming(&self) -> bool {
        match self.transfer_type.as_deref() {
            Some(t) => !t.eq_ignore_ascii_case("out"),
            None => true,
        }
    }
}

// =============================================================================
// Reconciliation Decision
// =============================================================================

/// Why a webhook event was ignored rather than applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No scheme tag + token found in the memo text.
    NoCodeFound,
    /// No order carries the extracted payment code.
    OrderNotFound,
    /// Reported transfer amount differs from the order total.
    AmountMismatch,
    /// The event reports an outbound transfer.
    NotIncoming,
    /// The order's payment status admits no transition (e.g. `Failed`).
    NotPending,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IgnoreReason::NoCodeFound => "no_code_found",
            IgnoreReason::OrderNotFound => "order_not_found",
            IgnoreReason::AmountMismatch => "amount_mismatch",
            IgnoreReason::NotIncoming => "not_incoming",
            IgnoreReason::NotPending => "not_pending",
        };
        f.write_str(s)
    }
}

/// What the reconciliation engine should do with a matched order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// Apply the Pending → Paid / PENDING → CONFIRMED transition.
    MarkPaid,
    /// Order already paid; acknowledge without touching it (replay safety).
    AlreadyPaid,
    /// Leave the order untouched and acknowledge with a reason.
    Ignore(IgnoreReason),
}

/// Result envelope of a reconciliation run. Always a success from the
/// provider's perspective; business mismatches are reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum ReconcileOutcome {
    /// The order transitioned to Paid / CONFIRMED.
    Updated { order_id: String },
    /// The order was already Paid; the replay was a no-op.
    AlreadyPaid { order_id: String },
    /// The event was acknowledged but did not change any order.
    Ignored { reason: IgnoreReason },
}

/// Pure reconciliation decision for an order matched by payment code.
///
/// ## Decision Table
/// ```text
/// transfer amount   payment status   decision
/// ───────────────   ──────────────   ─────────────────────────
/// ≠ order total     (any)            Ignore(AmountMismatch)
/// = total / none    Pending          MarkPaid
/// = total / none    Paid             AlreadyPaid
/// = total / none    Failed           Ignore(NotPending)
/// ```
///
/// The amount check runs first: a mismatched transfer must never be absorbed
/// by the already-paid no-op path, because support needs to see it logged.
pub fn reconcile_decision(
    payment_status: PaymentStatus,
    order_total: i64,
    transfer_amount: Option<i64>,
) -> ReconcileDecision {
    if let Some(amount) = transfer_amount {
        if amount != order_total {
            return ReconcileDecision::Ignore(IgnoreReason::AmountMismatch);
        }
    }

    match payment_status {
        PaymentStatus::Pending => ReconcileDecision::MarkPaid,
        PaymentStatus::Paid => ReconcileDecision::AlreadyPaid,
        PaymentStatus::Failed => ReconcileDecision::Ignore(IgnoreReason::NotPending),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, PaymentInfo, ShippingAddress};
    use chrono::Utc;

    fn bank() -> BankAccount {
        BankAccount {
            bank_code: "970436".to_string(),
            account_no: "0011002233445".to_string(),
            account_name: "SEVMART JSC".to_string(),
        }
    }

    fn order(id: &str, total: i64) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            customer_id: "user-1".to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total_amount: total,
            items: Vec::new(),
            shipping: ShippingAddress {
                receiver: "Nguyễn Văn A".to_string(),
                phone: "0900000001".to_string(),
                address: "12 Lê Lợi, Q1, TP.HCM".to_string(),
            },
            payment: PaymentInfo::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_code_uses_uppercased_id_suffix() {
        let code = payment_code_for("0f3c9e1a-77aa-4c2e-9d41-6b20e1ab12cd", 6);
        assert_eq!(code, "SEVQRAB12CD");
    }

    #[test]
    fn test_payment_code_short_id() {
        // Ids shorter than the suffix use the whole id
        assert_eq!(payment_code_for("x9", 6), "SEVQRX9");
    }

    #[test]
    fn test_payment_code_longer_suffix_on_retry() {
        let id = "0f3c9e1a-77aa-4c2e-9d41-6b20e1ab12cd";
        assert_eq!(payment_code_for(id, 8), "SEVQRE1AB12CD");
    }

    #[test]
    fn test_payment_request_embeds_amount_and_code() {
        let order = order("0f3c9e1a-77aa-4c2e-9d41-6b20e1ab12cd", 150_000);
        let request = payment_request_for(&order, &bank(), DEFAULT_CODE_SUFFIX_LEN).unwrap();

        assert_eq!(request.payment_code, "SEVQRAB12CD");
        assert_eq!(request.amount, 150_000);
        assert!(request.qr_url.contains("970436-0011002233445"));
        assert!(request.qr_url.contains("amount=150000"));
        assert!(request.qr_url.contains("addInfo=SEVQRAB12CD"));
    }

    #[test]
    fn test_payment_request_rejects_non_positive_total() {
        let order = order("abc123", 0);
        assert!(matches!(
            payment_request_for(&order, &bank(), DEFAULT_CODE_SUFFIX_LEN),
            Err(CoreError::InvalidAmount { amount: 0 })
        ));
    }

    #[test]
    fn test_extract_from_bank_memo() {
        let memo = "CK tu NGUYEN VAN A SEVQR3F9A2B noi dung chuyen tien";
        assert_eq!(extract_payment_code(memo).as_deref(), Some("SEVQR3F9A2B"));
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        assert_eq!(
            extract_payment_code("thanh toan sevqr3f9a2b").as_deref(),
            Some("SEVQR3F9A2B")
        );
    }

    #[test]
    fn test_extract_legacy_tag() {
        assert_eq!(
            extract_payment_code("chuyen khoan NHFOOD-7K2M9P don hang").as_deref(),
            Some("NHFOOD-7K2M9P")
        );
    }

    #[test]
    fn test_extract_no_match() {
        assert_eq!(extract_payment_code("tien rau thang 7"), None);
        assert_eq!(extract_payment_code(""), None);
        // Tag with no token after it is not a match
        assert_eq!(extract_payment_code("SEVQR "), None);
    }

    #[test]
    fn test_extract_stops_at_non_alphanumeric() {
        assert_eq!(
            extract_payment_code("SEVQRAB12CD.them chu").as_deref(),
            Some("SEVQRAB12CD")
        );
    }

    #[test]
    fn test_decision_amount_mismatch_wins() {
        // 150000₫ order, 140000₫ transfer: ignored even when already paid
        assert_eq!(
            reconcile_decision(PaymentStatus::Pending, 150_000, Some(140_000)),
            ReconcileDecision::Ignore(IgnoreReason::AmountMismatch)
        );
        assert_eq!(
            reconcile_decision(PaymentStatus::Paid, 150_000, Some(140_000)),
            ReconcileDecision::Ignore(IgnoreReason::AmountMismatch)
        );
    }

    #[test]
    fn test_decision_marks_pending_paid() {
        assert_eq!(
            reconcile_decision(PaymentStatus::Pending, 150_000, Some(150_000)),
            ReconcileDecision::MarkPaid
        );
        // A missing amount is not a mismatch
        assert_eq!(
            reconcile_decision(PaymentStatus::Pending, 150_000, None),
            ReconcileDecision::MarkPaid
        );
    }

    #[test]
    fn test_decision_replay_is_noop() {
        assert_eq!(
            reconcile_decision(PaymentStatus::Paid, 150_000, Some(150_000)),
            ReconcileDecision::AlreadyPaid
        );
    }

    #[test]
    fn test_decision_failed_is_ignored() {
        assert_eq!(
            reconcile_decision(PaymentStatus::Failed, 150_000, Some(150_000)),
            ReconcileDecision::Ignore(IgnoreReason::NotPending)
        );
    }

    #[test]
    fn test_webhook_event_memo_and_direction() {
        let event = PaymentWebhookEvent {
            content: Some("CK SEVQRAB12CD".to_string()),
            description: Some("GD 12345".to_string()),
            transfer_type: Some("in".to_string()),
            ..Default::default()
        };
        assert_eq!(event.memo(), "CK SEVQRAB12CD GD 12345");
        assert!(event.is_incoming());

        let outbound = PaymentWebhookEvent {
            transfer_type: Some("out".to_string()),
            ..Default::default()
        };
        assert!(!outbound.is_incoming());
    }

    #[test]
    fn test_webhook_event_deserializes_with_missing_fields() {
        let event: PaymentWebhookEvent =
            serde_json::from_str(r#"{"content":"SEVQRAB12CD","transferAmount":150000}"#).unwrap();
        assert_eq!(event.transfer_amount, Some(150_000));
        assert!(event.is_incoming());
    }
}
