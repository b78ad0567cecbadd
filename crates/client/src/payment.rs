//! Payment gateway seam.
//!
//! The gateway's own UI (a hosted checkout widget, a redirect, or a prompt
//! in a terminal) sits behind [`PaymentProvider`]. The checkout flow hands it
//! the gateway order created by the backend and waits for one of three
//! outcomes. Whatever the provider returns, the backend's verification is
//! the only thing that marks an order paid.

use async_trait::async_trait;
use shopfront_core::{PaymentIntent, PaymentVerification, Price};

/// Details shown to the user while collecting payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentContext {
    /// Merchant name displayed by the gateway.
    pub merchant_name: String,
    /// Human-readable order reference.
    pub order_number: String,
    /// Amount to collect.
    pub amount: Price,
    /// Prefilled contact number, when known.
    pub contact: Option<String>,
}

/// What the gateway reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The gateway says the payment went through. Still needs verification.
    Success(PaymentVerification),
    /// The gateway rejected the payment.
    Failed { reason: String },
    /// The user closed the payment UI without paying.
    Dismissed,
}

/// A way of collecting payment for a gateway order.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Present the payment UI for `intent` and wait for the user to finish.
    async fn collect(&self, intent: &PaymentIntent, context: &PaymentContext) -> PaymentOutcome;
}
