//! Payment gateway hand-off types.
//!
//! The backend creates a gateway order for a pending [`super::Order`] and
//! hands the identifiers to the client ([`PaymentIntent`]). The gateway
//! widget returns a payment id and signature which the client posts back
//! ([`PaymentVerification`]) for server-side signature checking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, PaymentId};
use super::price::{CurrencyCode, Price};
use super::status::PaymentStatus;

/// Body of `POST /payments/create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub order_id: OrderId,
}

/// Identifiers needed to open the gateway widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    #[serde(rename = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(rename = "razorpay_key_id")]
    pub key_id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
}

impl PaymentIntent {
    /// Amount as a price, falling back to INR for unknown currency codes.
    #[must_use]
    pub fn price(&self) -> Price {
        let currency = self.currency.parse().unwrap_or(CurrencyCode::INR);
        Price::from_minor_units(self.amount, currency)
    }
}

/// Callback values from a successful gateway payment, sent to
/// `POST /payments/verify`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    #[serde(rename = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(rename = "razorpay_payment_id")]
    pub gateway_payment_id: String,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

impl std::fmt::Debug for PaymentVerification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentVerification")
            .field("gateway_order_id", &self.gateway_order_id)
            .field("gateway_payment_id", &self.gateway_payment_id)
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// A payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub gateway: String,
    pub gateway_order_id: String,
    #[serde(default)]
    pub gateway_payment_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_names() {
        let json = r#"{
            "razorpay_order_id": "order_NkX1",
            "razorpay_key_id": "rzp_test_abc",
            "amount": 52082,
            "currency": "INR",
            "order_id": "3d6f0a52-8c1e-4b7a-9f2d-5e6a7b8c9d0e"
        }"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.gateway_order_id, "order_NkX1");
        assert_eq!(intent.price().display(), "₹520.82");
    }

    #[test]
    fn test_verification_wire_names_and_redaction() {
        let verification = PaymentVerification {
            gateway_order_id: "order_NkX1".to_string(),
            gateway_payment_id: "pay_Q2".to_string(),
            signature: "deadbeef".to_string(),
        };
        let json = serde_json::to_value(&verification).unwrap();
        assert_eq!(json["razorpay_payment_id"], "pay_Q2");
        assert_eq!(json["razorpay_signature"], "deadbeef");
        assert!(!format!("{verification:?}").contains("deadbeef"));
    }
}
